use axum::{extract::State, response::IntoResponse};

use crate::web::api::error::or_empty;
use crate::web::state::AppState;

use super::templates::DashboardTemplate;

pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.collector.lock().await.status();
    let collector_mode = if status.running {
        format!("{:?}", status.mode).to_lowercase()
    } else {
        "stopped".to_string()
    };

    DashboardTemplate {
        record_count: or_empty("record count", state.analytics.count()),
        collector_mode,
        inserted: status.inserted,
        failures: status.fetch_failures + status.store_failures,
        interval: humantime::format_duration(state.config.collector.interval).to_string(),
        last_error: status.last_error.unwrap_or_default(),
    }
}
