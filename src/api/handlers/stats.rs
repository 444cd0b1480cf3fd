//! Statistics handler.

use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;

use crate::app_state::AppState;
use crate::service::stats_service::StatsOverview;

/// `GET /stats/overview` — Cross-event statistics rollup.
#[utoipa::path(
    get,
    path = "/api/v1/stats/overview",
    tag = "Statistics",
    summary = "Statistics overview",
    description = "Partitions events into active/completed/upcoming and reports ticket utilization, a monthly histogram, and per-event participation trends. Pure read: stored ticket counters are never touched.",
    responses(
        (status = 200, description = "Statistics overview", body = StatsOverview),
    )
)]
pub async fn stats_overview(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.stats_service.overview().await)
}

/// Statistics routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/stats/overview", get(stats_overview))
}
