use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::feed::FetchError;
use crate::telemetry::NewRecord;

const CORE_FIELDS: [&str; 5] = ["latitude", "longitude", "altitude", "velocity", "timestamp"];

/// One validated sample from the upstream feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSample {
    pub timestamp: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub velocity: Option<f64>,
    pub extra: Map<String, Value>,
}

impl FeedSample {
    /// Validate a decoded response body. Latitude, longitude and altitude are
    /// required; everything the core does not know about lands in `extra`.
    pub fn from_json(body: Value) -> Result<Self, FetchError> {
        let Value::Object(mut fields) = body else {
            return Err(FetchError::Malformed("expected a JSON object".into()));
        };

        let latitude = required(&fields, "latitude")?;
        let longitude = required(&fields, "longitude")?;
        let altitude = required(&fields, "altitude")?;
        let velocity = fields.get("velocity").and_then(Value::as_f64);
        let timestamp = fields.get("timestamp").and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
        });

        for key in CORE_FIELDS {
            fields.remove(key);
        }

        Ok(FeedSample {
            timestamp,
            latitude,
            longitude,
            altitude,
            velocity,
            extra: fields,
        })
    }

    /// Normalize into a storable record. A missing or out of range feed
    /// timestamp falls back to `now`.
    pub fn into_record(self, now: DateTime<Utc>) -> NewRecord {
        let observed_at = self
            .timestamp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or(now);

        NewRecord {
            observed_at,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            velocity: self.velocity,
            extra: (!self.extra.is_empty()).then_some(self.extra),
        }
    }
}

fn required(fields: &Map<String, Value>, name: &str) -> Result<f64, FetchError> {
    fields
        .get(name)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .ok_or_else(|| FetchError::Malformed(format!("missing or non-numeric '{}'", name)))
}
