use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Upstream returned status {0}")]
    Status(u16),
    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("Malformed sample: {0}")]
    Malformed(String),
}
