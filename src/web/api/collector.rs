use axum::{extract::State, Json};

use crate::collector::CollectorStatus;
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/collector",
    responses(
        (status = 200, description = "Collector state and counters", body = CollectorStatus)
    ),
    tag = "collector"
)]
pub async fn status(State(state): State<AppState>) -> Json<CollectorStatus> {
    let collector = state.collector.lock().await;
    Json(collector.status())
}
