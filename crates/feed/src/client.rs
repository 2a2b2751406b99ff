use reqwest::Client;

use crate::error::FeedError;
use crate::models::Feed;
use crate::parsers::parse_feed;

/// Feed fetcher client.
///
/// Wraps a shared `reqwest::Client`; the User-Agent header and TLS
/// relaxation are the caller's responsibility when building that client.
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    /// Create a new FeedClient with a custom reqwest Client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch and parse a feed document
    ///
    /// # Arguments
    /// * `url` - The feed URL to fetch from
    ///
    /// # Returns
    /// The parsed feed with entries in document order
    pub async fn fetch(&self, url: &str) -> crate::Result<Feed> {
        tracing::debug!("Fetching feed from: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FeedError::Status {
                status,
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        let feed = parse_feed(&bytes)?;

        tracing::debug!("Parsed {} entries from {}", feed.entries.len(), url);
        Ok(feed)
    }
}
