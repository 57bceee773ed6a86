mod collector;
mod error;
mod types;

pub use collector::Collector;
pub use error::CollectorError;
pub use types::{CollectorMode, CollectorSettings, CollectorStatus, CycleOutcome, MIN_INTERVAL};
