mod record;

pub use record::{format_ts_utc, NewRecord, TelemetryRecord};
