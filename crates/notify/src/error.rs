use thiserror::Error;

/// A single webhook delivery failure.
///
/// Always recovered locally: the dispatcher logs it and moves on to the
/// next message or target.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-JSON response or a non-zero provider error code; carries the
    /// raw response body for the log.
    #[error("provider rejected the message: {0}")]
    Api(String),
}
