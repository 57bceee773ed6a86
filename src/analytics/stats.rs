use serde::Serialize;
use utoipa::ToSchema;

use crate::telemetry::TelemetryRecord;

/// Descriptive stats for a run of records. Zeros and empty strings when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Stats {
    pub count: u64,
    pub first_timestamp: String,
    pub last_timestamp: String,
    pub duration_seconds: i64,
    pub altitude_avg: f64,
    pub altitude_min: f64,
    pub altitude_max: f64,
}

pub fn stats(records: &[TelemetryRecord]) -> Stats {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Stats::default();
    };

    let (sum, min, max) = records.iter().fold(
        (0.0, f64::INFINITY, f64::NEG_INFINITY),
        |(sum, min, max), r| (sum + r.altitude, min.min(r.altitude), max.max(r.altitude)),
    );

    Stats {
        count: records.len() as u64,
        first_timestamp: first.ts_utc.clone(),
        last_timestamp: last.ts_utc.clone(),
        duration_seconds: last.timestamp_unix - first.timestamp_unix,
        altitude_avg: sum / records.len() as f64,
        altitude_min: min,
        altitude_max: max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::records_at;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn empty_set_is_zeroed() {
        let s = stats(&[]);
        assert_eq!(s, Stats::default());
        assert!(s.first_timestamp.is_empty());
    }

    #[test]
    fn spans_first_to_last_record() {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let set = records_at(base, Duration::seconds(30), &[400.0, 410.0, 390.0, 420.0]);

        let s = stats(&set);
        assert_eq!(s.count, 4);
        assert_eq!(s.first_timestamp, "2024-05-01T12:00:00Z");
        assert_eq!(s.last_timestamp, "2024-05-01T12:01:30Z");
        assert_eq!(s.duration_seconds, 90);
        assert_eq!(s.altitude_avg, 405.0);
        assert_eq!(s.altitude_min, 390.0);
        assert_eq!(s.altitude_max, 420.0);
    }
}
