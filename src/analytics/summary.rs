use serde::Serialize;
use utoipa::ToSchema;

use crate::telemetry::TelemetryRecord;

/// Extremal values over a set of records. All zero for an empty set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Summary {
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_altitude: f64,
    pub max_altitude: f64,
    pub count: u64,
}

pub fn summarize(records: &[TelemetryRecord]) -> Summary {
    let Some(first) = records.first() else {
        return Summary::default();
    };

    records.iter().skip(1).fold(
        Summary {
            min_longitude: first.longitude,
            max_longitude: first.longitude,
            min_altitude: first.altitude,
            max_altitude: first.altitude,
            count: 1,
        },
        |acc, r| Summary {
            min_longitude: acc.min_longitude.min(r.longitude),
            max_longitude: acc.max_longitude.max(r.longitude),
            min_altitude: acc.min_altitude.min(r.altitude),
            max_altitude: acc.max_altitude.max(r.altitude),
            count: acc.count + 1,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::records;

    #[test]
    fn empty_set_is_zeroed() {
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn altitude_and_longitude_extrema() {
        let mut set = records(&[400.0, 410.0, 395.0]);
        set[0].longitude = -170.5;
        set[1].longitude = 12.0;
        set[2].longitude = 179.9;

        let summary = summarize(&set);
        assert_eq!(summary.min_altitude, 395.0);
        assert_eq!(summary.max_altitude, 410.0);
        assert_eq!(summary.min_longitude, -170.5);
        assert_eq!(summary.max_longitude, 179.9);
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn single_record_is_its_own_extremum() {
        let summary = summarize(&records(&[420.25]));
        assert_eq!(summary.min_altitude, 420.25);
        assert_eq!(summary.max_altitude, 420.25);
        assert_eq!(summary.count, 1);
    }
}
