mod error;
mod http;
mod sample;

use async_trait::async_trait;

pub use error::FetchError;
pub use http::{HttpFeedClient, DEFAULT_FEED_URL};
pub use sample::FeedSample;

/// Source of telemetry samples. One call, one sample, no state.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self) -> Result<FeedSample, FetchError>;
}
