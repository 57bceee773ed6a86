use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::telemetry::AnalyticsResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::telemetry::current,
        super::api::telemetry::data,
        super::api::telemetry::analytics,
        super::api::telemetry::recent,
        super::api::telemetry::stats,
        super::api::collector::status,
    ),
    components(
        schemas(
            AnalyticsResponse,
            ErrorResponse,
            crate::telemetry::TelemetryRecord,
            crate::analytics::Summary,
            crate::analytics::AltitudeJump,
            crate::analytics::Stats,
            crate::collector::CollectorStatus,
            crate::collector::CollectorMode,
        )
    ),
    info(
        title = "iss-o-mat Telemetry API",
        description = "Read access to collected ISS telemetry and derived analytics",
        version = "0.1.0"
    ),
    tags(
        (name = "telemetry", description = "Stored samples and analytics"),
        (name = "collector", description = "Background collector state")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/current",
            "/api/data",
            "/api/analytics",
            "/api/recent",
            "/api/stats",
            "/api/collector",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
