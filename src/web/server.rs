use axum::{routing::get, Router};
use std::future::Future;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::collector as collector_handlers;
use super::api::telemetry as telemetry_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;
use super::ui::handlers as ui_handlers;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = state.config.web.static_dir.clone();

    Router::new()
        // UI routes
        .route("/", get(ui_handlers::dashboard))
        // Telemetry API endpoints
        .route("/api/current", get(telemetry_handlers::current))
        .route("/api/data", get(telemetry_handlers::data))
        .route("/api/analytics", get(telemetry_handlers::analytics))
        .route("/api/recent", get(telemetry_handlers::recent))
        .route("/api/stats", get(telemetry_handlers::stats))
        // Collector API endpoints
        .route("/api/collector", get(collector_handlers::status))
        // Static files
        .nest_service("/static", ServeDir::new(static_dir))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let bind_addr = state.config.web.bind.clone();
    let app = create_router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use crate::analytics::Analytics;
    use crate::collector::Collector;
    use crate::feed::HttpFeedClient;
    use crate::store::Store;
    use crate::telemetry::NewRecord;
    use crate::web::config::Config;

    fn make_test_state(store: Arc<Store>) -> AppState {
        let config = Config::default();
        let feed = HttpFeedClient::new("http://127.0.0.1:9/unused", config.feed.timeout)
            .expect("feed client");
        let collector = Collector::new(Arc::new(feed), store.clone(), config.collector_settings());

        AppState {
            config: Arc::new(config),
            analytics: Analytics::new(store),
            collector: Arc::new(Mutex::new(collector)),
        }
    }

    fn empty_store() -> Arc<Store> {
        Arc::new(Store::open_in_memory("telemetry").expect("store"))
    }

    fn seeded_store(altitudes: &[f64]) -> Arc<Store> {
        let store = empty_store();
        let start = Utc::now() - Duration::minutes(altitudes.len() as i64);
        for (i, alt) in altitudes.iter().enumerate() {
            store
                .insert(&NewRecord::new(start + Duration::minutes(i as i64), 10.0, 20.0 + i as f64, *alt))
                .expect("insert");
        }
        store
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_empty_store_endpoints() {
        let router = create_router(make_test_state(empty_store()));

        let (status, json) = get_json(router.clone(), "/api/current").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({}));

        let (_, json) = get_json(router.clone(), "/api/data").await;
        assert_eq!(json, serde_json::json!([]));

        let (_, json) = get_json(router.clone(), "/api/analytics").await;
        assert_eq!(json["summary"]["count"], 0);
        assert_eq!(json["summary"]["max_altitude"], 0.0);
        assert_eq!(json["top_jumps"], serde_json::json!([]));

        let (_, json) = get_json(router.clone(), "/api/recent").await;
        assert_eq!(json, serde_json::json!([]));

        let (_, json) = get_json(router, "/api/stats").await;
        assert_eq!(json["count"], 0);
        assert_eq!(json["first_timestamp"], "");
    }

    #[tokio::test]
    async fn test_current_and_history() {
        let router = create_router(make_test_state(seeded_store(&[400.0, 405.0, 398.0])));

        let (_, current) = get_json(router.clone(), "/api/current").await;
        assert_eq!(current["id"], 3);
        assert_eq!(current["altitude"], 398.0);

        let (_, data) = get_json(router, "/api/data").await;
        let ids: Vec<i64> = data
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_analytics_endpoint() {
        let router = create_router(make_test_state(seeded_store(&[400.0, 405.0, 398.0, 420.0])));

        let (status, json) = get_json(router, "/api/analytics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"]["min_altitude"], 398.0);
        assert_eq!(json["summary"]["max_altitude"], 420.0);
        assert_eq!(json["summary"]["count"], 4);

        let jumps = json["top_jumps"].as_array().unwrap();
        assert_eq!(jumps.len(), 3);
        assert_eq!(jumps[0]["from_record_id"], 3);
        assert_eq!(jumps[0]["to_record_id"], 4);
        assert_eq!(jumps[0]["delta"], 22.0);
    }

    #[tokio::test]
    async fn test_recent_window_caps_per_day() {
        let router = create_router(make_test_state(seeded_store(&[400.0, 401.0, 402.0])));

        let (_, json) = get_json(router.clone(), "/api/recent?days=1&per_day=10").await;
        assert_eq!(json.as_array().unwrap().len(), 3);

        // The seeded minutes may straddle midnight UTC, giving a second bucket.
        let (_, json) = get_json(router.clone(), "/api/recent?days=1&per_day=2").await;
        let ids: Vec<i64> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert!(ids.starts_with(&[1, 2]), "unexpected ids {:?}", ids);

        let (status, json) = get_json(router.clone(), "/api/recent?days=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_failed");

        // Far enough back to leave chrono's representable range.
        let (status, json) = get_json(router.clone(), "/api/recent?days=100000000").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_failed");

        let (status, json) = get_json(router, "/api/recent?days=36500&per_day=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_stats_and_collector_status() {
        let router = create_router(make_test_state(seeded_store(&[400.0, 410.0])));

        let (_, stats) = get_json(router.clone(), "/api/stats").await;
        assert_eq!(stats["count"], 2);
        assert_eq!(stats["duration_seconds"], 60);
        assert_eq!(stats["altitude_avg"], 405.0);

        let (status, collector) = get_json(router, "/api/collector").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(collector["mode"], "idle");
        assert_eq!(collector["running"], false);
    }
}
