//! Read-only computations over snapshots of the telemetry store.

mod jumps;
mod stats;
mod summary;
mod window;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::store::{StorageError, Store};
use crate::telemetry::TelemetryRecord;

pub use jumps::{top_altitude_jumps, AltitudeJump};
pub use stats::{stats, Stats};
pub use summary::{summarize, Summary};
pub use window::sample_per_day;

/// Runs the analytics functions against fresh store snapshots. Never writes.
#[derive(Clone)]
pub struct Analytics {
    store: Arc<Store>,
}

impl Analytics {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn latest(&self) -> Result<Option<TelemetryRecord>, StorageError> {
        self.store.latest()
    }

    pub fn history(&self) -> Result<Vec<TelemetryRecord>, StorageError> {
        self.store.scan_all()
    }

    pub fn count(&self) -> Result<u64, StorageError> {
        self.store.count()
    }

    pub fn summarize(&self) -> Result<Summary, StorageError> {
        Ok(summarize(&self.store.scan_all()?))
    }

    pub fn top_altitude_jumps(&self, k: usize) -> Result<Vec<AltitudeJump>, StorageError> {
        Ok(top_altitude_jumps(&self.store.scan_all()?, k))
    }

    /// Summary and top jumps computed from one snapshot.
    pub fn overview(&self, k: usize) -> Result<(Summary, Vec<AltitudeJump>), StorageError> {
        let records = self.store.scan_all()?;
        Ok((summarize(&records), top_altitude_jumps(&records, k)))
    }

    pub fn stats(&self) -> Result<Stats, StorageError> {
        Ok(stats(&self.store.scan_all()?))
    }

    pub fn windowed(&self, cutoff: DateTime<Utc>) -> Result<Vec<TelemetryRecord>, StorageError> {
        self.store.scan_since(cutoff)
    }

    pub fn sampled_windowed(
        &self,
        cutoff: DateTime<Utc>,
        per_bucket_cap: usize,
    ) -> Result<Vec<TelemetryRecord>, StorageError> {
        Ok(sample_per_day(self.windowed(cutoff)?, per_bucket_cap))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::telemetry::{NewRecord, TelemetryRecord};

    /// Records with ids 1.. one second apart, carrying the given altitudes.
    pub fn records(altitudes: &[f64]) -> Vec<TelemetryRecord> {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        records_at(base, Duration::seconds(1), altitudes)
    }

    pub fn records_at(
        base: DateTime<Utc>,
        step: Duration,
        altitudes: &[f64],
    ) -> Vec<TelemetryRecord> {
        altitudes
            .iter()
            .enumerate()
            .map(|(i, alt)| {
                NewRecord::new(base + step * i as i32, 51.6, 0.0, *alt).into_record(i as i64 + 1)
            })
            .collect()
    }
}
