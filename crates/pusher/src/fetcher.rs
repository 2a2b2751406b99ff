use std::collections::VecDeque;
use std::sync::LazyLock;

use futures::future::join_all;
use regex::Regex;
use tokio::sync::Mutex;

use feed::{Entry, Feed, FeedClient};
use notify::Message;

use crate::config::FeedConfig;
use crate::history::History;

/// Number of concurrent fetch workers per project.
const WORKER_COUNT: usize = 5;

// Summaries arrive as HTML; tags are stripped with the non-greedy pattern
// before display.
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.+?>").unwrap());

/// Fetches a project's feeds and collects messages for entries not yet in
/// the history.
pub struct Fetcher {
    client: FeedClient,
}

impl Fetcher {
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: FeedClient::with_client(client),
        }
    }

    /// Fetch every feed in `feeds` with a bounded worker pool.
    ///
    /// New-entry messages are appended to the shared list in discovery
    /// order (newest first within a feed); the history map is updated in
    /// place for each successful non-empty fetch. A failed fetch is logged
    /// and skipped, leaving that feed's history untouched so the next
    /// round retries from the old baseline.
    pub async fn fetch_project(
        &self,
        feeds: Vec<FeedConfig>,
        messages: &Mutex<Vec<Message>>,
        history: &Mutex<History>,
    ) {
        let queue = Mutex::new(VecDeque::from(feeds));
        let workers = (0..WORKER_COUNT).map(|_| self.worker(&queue, messages, history));
        join_all(workers).await;
    }

    async fn worker(
        &self,
        queue: &Mutex<VecDeque<FeedConfig>>,
        messages: &Mutex<Vec<Message>>,
        history: &Mutex<History>,
    ) {
        loop {
            let cfg = { queue.lock().await.pop_front() };
            let Some(cfg) = cfg else { break };

            let fetched = match self.client.fetch(&cfg.url).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    tracing::error!("[{}] feed fetch failed: {}", cfg.url, e);
                    continue;
                }
            };

            let seen = { history.lock().await.seen(&cfg.url).to_vec() };
            let (new_messages, replacement) = diff_feed(&fetched, &cfg, &seen);

            if !new_messages.is_empty() {
                tracing::debug!("[{}] {} new entries", cfg.url, new_messages.len());
                messages.lock().await.extend(new_messages);
            }
            if let Some(links) = replacement {
                history.lock().await.record(&cfg.url, links);
            }
        }
    }
}

/// Compute the new-entry delta for one fetched feed.
///
/// Entries are scanned in document order (assumed newest first); the scan
/// stops at the first link already present in `seen`, so anything the feed
/// pushed past its own window between rounds is silently missed. Returns
/// the messages for the new entries plus the replacement history list.
/// The replacement is `None` when the fetch held no entries at all, which
/// leaves prior history in place on a transient empty response.
fn diff_feed(
    fetched: &Feed,
    cfg: &FeedConfig,
    seen: &[String],
) -> (Vec<Message>, Option<Vec<String>>) {
    let mut new_messages = Vec::new();
    for entry in &fetched.entries {
        if seen.iter().any(|link| link == &entry.link) {
            break;
        }
        new_messages.push(build_message(fetched, cfg, entry));
    }

    let replacement = if fetched.entries.is_empty() {
        None
    } else {
        Some(fetched.entries.iter().map(|e| e.link.clone()).collect())
    };

    (new_messages, replacement)
}

fn build_message(fetched: &Feed, cfg: &FeedConfig, entry: &Entry) -> Message {
    // Display name precedence: explicit override, then the entry author
    // when enabled and present, then the feed's own title.
    let feed_name = cfg
        .name
        .clone()
        .or_else(|| {
            if cfg.show_author {
                entry.author.clone()
            } else {
                None
            }
        })
        .unwrap_or_else(|| fetched.title.clone());

    let show_text = if cfg.show_text || cfg.only_text {
        format!("{}\n", TAG_REGEX.replace_all(&entry.summary, "").trim())
    } else {
        String::new()
    };

    Message {
        feed_name,
        title: entry.title.trim().to_string(),
        link: entry.link.clone(),
        show_text,
        only_text: cfg.only_text,
    }
}
