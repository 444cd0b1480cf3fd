//! System endpoints: health check and export-format catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::service::ExportFormat;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Supported export format info.
#[derive(Debug, Serialize, ToSchema)]
struct ExportFormatInfo {
    format: ExportFormat,
    extension: &'static str,
    content_type: &'static str,
}

/// `GET /config/export-formats` — List supported export formats.
#[utoipa::path(
    get,
    path = "/config/export-formats",
    tag = "System",
    summary = "List supported export formats",
    description = "Returns metadata for every attendee-list export format the service can produce.",
    responses(
        (status = 200, description = "Export format catalog", body = Vec<ExportFormatInfo>),
    )
)]
pub async fn export_formats_handler() -> impl IntoResponse {
    let formats: Vec<ExportFormatInfo> = ExportFormat::ALL
        .into_iter()
        .map(|format| ExportFormatInfo {
            format,
            extension: format.extension(),
            content_type: format.content_type(),
        })
        .collect();
    (StatusCode::OK, Json(formats))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/export-formats", get(export_formats_handler))
}
