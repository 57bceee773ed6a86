use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("collector already running")]
    AlreadyRunning,
}
