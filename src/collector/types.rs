use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Upstream's minimum allowed spacing between requests.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
pub struct CollectorSettings {
    pub interval: Duration,
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CollectorMode {
    Idle,
    Fetching,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CollectorStatus {
    pub mode: CollectorMode,
    pub running: bool,
    pub cycles: u64,
    pub inserted: u64,
    pub fetch_failures: u64,
    pub store_failures: u64,
    pub last_sequence_id: Option<i64>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl Default for CollectorStatus {
    fn default() -> Self {
        Self {
            mode: CollectorMode::Idle,
            running: false,
            cycles: 0,
            inserted: 0,
            fetch_failures: 0,
            store_failures: 0,
            last_sequence_id: None,
            last_success: None,
            last_error: None,
        }
    }
}

/// What happened during one collection cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Inserted(i64),
    FetchFailed(String),
    StoreFailed(String),
    /// Stop was requested while the fetch was outstanding.
    Abandoned,
}
