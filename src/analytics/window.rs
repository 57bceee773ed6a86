use chrono::NaiveDate;
use std::collections::HashMap;

use crate::telemetry::TelemetryRecord;

/// Keep the first `per_bucket_cap` records of each UTC calendar day.
///
/// This is a deterministic head sample used to bound payload size, not a
/// representative sample. Input order is preserved.
pub fn sample_per_day(records: Vec<TelemetryRecord>, per_bucket_cap: usize) -> Vec<TelemetryRecord> {
    let mut seen: HashMap<NaiveDate, usize> = HashMap::new();

    records
        .into_iter()
        .filter(|record| {
            let taken = seen.entry(record.observed_at().date_naive()).or_insert(0);
            if *taken < per_bucket_cap {
                *taken += 1;
                true
            } else {
                false
            }
        })
        .collect()
}
