use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::analytics::{AltitudeJump, Stats, Summary};
use crate::telemetry::TelemetryRecord;
use crate::web::api::error::{or_empty, ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsResponse {
    pub summary: Summary,
    pub top_jumps: Vec<AltitudeJump>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub days: Option<u32>,
    pub per_day: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/current",
    responses(
        (status = 200, description = "Latest sample, or an empty object before the first one", body = TelemetryRecord)
    ),
    tag = "telemetry"
)]
pub async fn current(State(state): State<AppState>) -> Json<Value> {
    match or_empty("current sample", state.analytics.latest()) {
        Some(record) => Json(serde_json::to_value(record).unwrap_or_else(|_| json!({}))),
        None => Json(json!({})),
    }
}

#[utoipa::path(
    get,
    path = "/api/data",
    responses(
        (status = 200, description = "Full history, oldest first", body = Vec<TelemetryRecord>)
    ),
    tag = "telemetry"
)]
pub async fn data(State(state): State<AppState>) -> Json<Vec<TelemetryRecord>> {
    Json(or_empty("history", state.analytics.history()))
}

#[utoipa::path(
    get,
    path = "/api/analytics",
    responses(
        (status = 200, description = "Extrema and largest altitude jumps", body = AnalyticsResponse)
    ),
    tag = "telemetry"
)]
pub async fn analytics(State(state): State<AppState>) -> Json<AnalyticsResponse> {
    let k = state.config.analytics.top_jumps;
    let (summary, top_jumps) = or_empty("analytics", state.analytics.overview(k));
    Json(AnalyticsResponse { summary, top_jumps })
}

#[utoipa::path(
    get,
    path = "/api/recent",
    params(
        ("days" = Option<u32>, Query, description = "Window length in days"),
        ("per_day" = Option<usize>, Query, description = "Keep only the first N samples of each UTC day")
    ),
    responses(
        (status = 200, description = "Samples inside the window, oldest first", body = Vec<TelemetryRecord>),
        (status = 400, description = "Invalid parameters", body = ErrorResponse)
    ),
    tag = "telemetry"
)]
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<Vec<TelemetryRecord>>> {
    let defaults = &state.config.analytics;
    let days = query.days.unwrap_or(defaults.recent_days);
    if days == 0 {
        return Err(ApiError::Validation("days must be positive".into()));
    }
    if query.per_day == Some(0) {
        return Err(ApiError::Validation("per_day must be positive".into()));
    }

    let cutoff = Duration::try_days(days as i64)
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .ok_or_else(|| ApiError::Validation("days is out of range".into()))?;
    let records = match query.per_day.or(defaults.per_day_cap) {
        Some(cap) => state.analytics.sampled_windowed(cutoff, cap),
        None => state.analytics.windowed(cutoff),
    };

    Ok(Json(or_empty("recent window", records)))
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Count, time span and altitude statistics", body = Stats)
    ),
    tag = "telemetry"
)]
pub async fn stats(State(state): State<AppState>) -> Json<Stats> {
    Json(or_empty("stats", state.analytics.stats()))
}
