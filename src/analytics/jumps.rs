use serde::Serialize;
use std::cmp::Ordering;
use utoipa::ToSchema;

use crate::telemetry::TelemetryRecord;

/// Absolute altitude change between two consecutive records.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AltitudeJump {
    pub from_record_id: i64,
    pub to_record_id: i64,
    pub delta: f64,
    pub from_ts_utc: String,
    pub to_ts_utc: String,
    pub from_altitude: f64,
    pub to_altitude: f64,
}

/// The `k` largest altitude jumps between sequence-adjacent records, largest
/// first, ties going to the smaller `from_record_id`.
///
/// `records` must be ascending by sequence id. Adjacency ignores time gaps, so
/// the last sample before an outage is compared with the first one after it.
pub fn top_altitude_jumps(records: &[TelemetryRecord], k: usize) -> Vec<AltitudeJump> {
    if k == 0 {
        return Vec::new();
    }

    let mut jumps: Vec<AltitudeJump> = records
        .windows(2)
        .map(|pair| AltitudeJump {
            from_record_id: pair[0].sequence_id,
            to_record_id: pair[1].sequence_id,
            delta: (pair[1].altitude - pair[0].altitude).abs(),
            from_ts_utc: pair[0].ts_utc.clone(),
            to_ts_utc: pair[1].ts_utc.clone(),
            from_altitude: pair[0].altitude,
            to_altitude: pair[1].altitude,
        })
        .collect();

    jumps.sort_by(|a, b| match b.delta.total_cmp(&a.delta) {
        Ordering::Equal => a.from_record_id.cmp(&b.from_record_id),
        other => other,
    });
    jumps.truncate(k);
    jumps
}
