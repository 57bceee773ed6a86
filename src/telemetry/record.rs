use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// A stored telemetry sample. Immutable once the store has assigned its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TelemetryRecord {
    /// Assigned by the store, strictly increasing in insertion order.
    #[serde(rename = "id")]
    pub sequence_id: i64,
    pub timestamp_unix: i64,
    pub ts_utc: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    /// Feed specific fields (visibility, footprint, solar sub-point, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub extra: Option<Map<String, Value>>,
}

impl TelemetryRecord {
    pub fn observed_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.timestamp_unix, 0)
            .single()
            .unwrap_or_default()
    }
}

/// A normalized sample that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub observed_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub velocity: Option<f64>,
    pub extra: Option<Map<String, Value>>,
}

impl NewRecord {
    pub fn new(observed_at: DateTime<Utc>, latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            observed_at,
            latitude,
            longitude,
            altitude,
            velocity: None,
            extra: None,
        }
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Name of the first required field that is absent (not a finite number).
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("latitude", self.latitude),
            ("longitude", self.longitude),
            ("altitude", self.altitude),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }

    pub fn into_record(self, sequence_id: i64) -> TelemetryRecord {
        TelemetryRecord {
            sequence_id,
            timestamp_unix: self.observed_at.timestamp(),
            ts_utc: format_ts_utc(self.observed_at),
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            velocity: self.velocity,
            extra: self.extra,
        }
    }
}

/// Second-resolution UTC rendering used for display, e.g. `2024-05-01T12:00:00Z`.
pub fn format_ts_utc(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
