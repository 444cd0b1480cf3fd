//! Export handler: renders an event's attendee list and streams it as a
//! download.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::app_state::AppState;
use crate::domain::EventId;
use crate::error::{ApiError, ErrorResponse};
use crate::service::ExportFormat;

/// Query parameters for `GET /events/{id}/export`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportParams {
    /// Target format: `csv`, `pdf`, or `excel`.
    pub format: String,
}

/// `GET /events/:id/export` — Export the attendee list.
///
/// The file is rendered to the export directory, read back, deleted,
/// and returned with attachment headers. The on-disk artifact never
/// outlives the request.
///
/// # Errors
///
/// Returns [`ApiError`] if the event is missing, the participant list
/// is empty, the format is unsupported, or rendering fails.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/export",
    tag = "Exports",
    summary = "Export an event's attendee list",
    params(
        ("id" = String, Path, description = "Event UUID"),
        ExportParams,
    ),
    responses(
        (status = 200, description = "Rendered file as an attachment"),
        (status = 400, description = "Malformed id or unsupported format", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 422, description = "No participants to export", body = ErrorResponse),
    )
)]
pub async fn export_participants(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = EventId::parse(&id)?;
    let format = ExportFormat::parse(&params.format)?;

    let participants = state
        .registration_service
        .event_participants(event_id)
        .await?;
    let path = state
        .export_service
        .export(&participants, event_id, format)
        .await?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::ExportFailure(format!("read {}: {e}", path.display())));
    state.export_service.cleanup(&path).await;
    let bytes = bytes?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("export")
        .to_string();

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    ))
}

/// Export routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/events/{id}/export", get(export_participants))
}
