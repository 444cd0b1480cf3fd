//! Participant handlers: registration, CRUD, and join/leave.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::dto::{
    PaginationParams, ParticipantListResponse, ParticipantResponse, RegisterParticipantRequest,
    UpdateParticipantRequest, paginate,
};
use crate::app_state::AppState;
use crate::domain::participant::{NewParticipant, ParticipantPatch};
use crate::domain::{EventId, ParticipantId};
use crate::error::{ApiError, ErrorResponse};

/// Query parameters for `GET /participants/search`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParticipantParams {
    /// Case-insensitive substring matched against "first last" names.
    pub q: String,
}

/// `POST /participants` — Register a participant, deduplicated by
/// email.
///
/// # Errors
///
/// Returns [`ApiError`] on validation failure, unknown event, duplicate
/// membership, or a sold-out event.
#[utoipa::path(
    post,
    path = "/api/v1/participants",
    tag = "Participants",
    summary = "Register a participant",
    description = "With `event_id` set, registers the participant for that event (creating or reusing the record by email) and resyncs the event's ticket counter. Without it, this is an idempotent lookup-or-create.",
    request_body = RegisterParticipantRequest,
    responses(
        (status = 201, description = "Participant record (created or reused)", body = ParticipantResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Already registered for the event", body = ErrorResponse),
        (status = 422, description = "Event sold out", body = ErrorResponse),
    )
)]
pub async fn register_participant(
    State(state): State<AppState>,
    Json(req): Json<RegisterParticipantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = req.event_id.map(EventId::from_uuid);
    let input = NewParticipant::try_from(req)?;
    let record = state
        .registration_service
        .register_participant(input, event_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ParticipantResponse::from(record))))
}

/// `GET /participants` — List all participants with pagination.
///
/// # Errors
///
/// Returns [`ApiError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/participants",
    tag = "Participants",
    summary = "List participants",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated participant list", body = ParticipantListResponse),
    )
)]
pub async fn list_participants(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state.registration_service.list_participants().await;
    let (page, pagination) = paginate(records, &params);
    Ok(Json(ParticipantListResponse {
        data: page.into_iter().map(ParticipantResponse::from).collect(),
        pagination,
    }))
}

/// `GET /participants/search` — Search participants by name.
///
/// # Errors
///
/// Returns [`ApiError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/participants/search",
    tag = "Participants",
    summary = "Search participants by name",
    params(SearchParticipantParams),
    responses(
        (status = 200, description = "Matching participants", body = Vec<ParticipantResponse>),
    )
)]
pub async fn search_participants(
    State(state): State<AppState>,
    Query(params): Query<SearchParticipantParams>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state
        .registration_service
        .search_participants(&params.q)
        .await;
    let data: Vec<ParticipantResponse> =
        records.into_iter().map(ParticipantResponse::from).collect();
    Ok(Json(data))
}

/// `GET /participants/:id` — Get one participant.
///
/// # Errors
///
/// Returns [`ApiError::ParticipantNotFound`] if the participant does
/// not exist.
#[utoipa::path(
    get,
    path = "/api/v1/participants/{id}",
    tag = "Participants",
    summary = "Get participant details",
    params(
        ("id" = String, Path, description = "Participant UUID"),
    ),
    responses(
        (status = 200, description = "Participant details", body = ParticipantResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Participant not found", body = ErrorResponse),
    )
)]
pub async fn get_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let participant_id = ParticipantId::parse(&id)?;
    let record = state
        .registration_service
        .get_participant(participant_id)
        .await?;
    Ok(Json(ParticipantResponse::from(record)))
}

/// `PUT /participants/:id` — Apply a partial field patch.
///
/// # Errors
///
/// Returns [`ApiError`] if the participant is missing or the new email
/// belongs to someone else.
#[utoipa::path(
    put,
    path = "/api/v1/participants/{id}",
    tag = "Participants",
    summary = "Update a participant",
    params(
        ("id" = String, Path, description = "Participant UUID"),
    ),
    request_body = UpdateParticipantRequest,
    responses(
        (status = 200, description = "Updated participant", body = ParticipantResponse),
        (status = 404, description = "Participant not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn update_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateParticipantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let participant_id = ParticipantId::parse(&id)?;
    let patch = ParticipantPatch::try_from(req)?;
    let record = state
        .registration_service
        .update_participant(participant_id, patch)
        .await?;
    Ok(Json(ParticipantResponse::from(record)))
}

/// `DELETE /participants/:id` — Delete a participant wholesale.
///
/// # Errors
///
/// Returns [`ApiError::ParticipantNotFound`] if the participant does
/// not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/participants/{id}",
    tag = "Participants",
    summary = "Delete a participant",
    description = "Removes the participant and all of its memberships, resyncing the ticket counters of every affected event.",
    params(
        ("id" = String, Path, description = "Participant UUID"),
    ),
    responses(
        (status = 204, description = "Participant deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Participant not found", body = ErrorResponse),
    )
)]
pub async fn delete_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let participant_id = ParticipantId::parse(&id)?;
    let _ = state
        .registration_service
        .delete_participant(participant_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /participants/:id/events/:event_id` — Join an event.
///
/// # Errors
///
/// Returns [`ApiError`] if either side is missing, the membership
/// already exists, or the event is sold out.
#[utoipa::path(
    post,
    path = "/api/v1/participants/{id}/events/{event_id}",
    tag = "Participants",
    summary = "Join an event",
    params(
        ("id" = String, Path, description = "Participant UUID"),
        ("event_id" = String, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Updated participant", body = ParticipantResponse),
        (status = 404, description = "Event or participant not found", body = ErrorResponse),
        (status = 409, description = "Already registered", body = ErrorResponse),
        (status = 422, description = "Event sold out", body = ErrorResponse),
    )
)]
pub async fn join_event(
    State(state): State<AppState>,
    Path((id, event_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let participant_id = ParticipantId::parse(&id)?;
    let event_id = EventId::parse(&event_id)?;
    let record = state
        .registration_service
        .join_event(participant_id, event_id)
        .await?;
    Ok(Json(ParticipantResponse::from(record)))
}

/// `DELETE /participants/:id/events/:event_id` — Leave an event.
///
/// # Errors
///
/// Returns [`ApiError`] if either side is missing or no membership
/// exists.
#[utoipa::path(
    delete,
    path = "/api/v1/participants/{id}/events/{event_id}",
    tag = "Participants",
    summary = "Leave an event",
    params(
        ("id" = String, Path, description = "Participant UUID"),
        ("event_id" = String, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Updated participant", body = ParticipantResponse),
        (status = 404, description = "Event or participant not found", body = ErrorResponse),
        (status = 409, description = "Not registered for the event", body = ErrorResponse),
    )
)]
pub async fn leave_event(
    State(state): State<AppState>,
    Path((id, event_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let participant_id = ParticipantId::parse(&id)?;
    let event_id = EventId::parse(&event_id)?;
    let record = state
        .registration_service
        .leave_event(participant_id, event_id)
        .await?;
    Ok(Json(ParticipantResponse::from(record)))
}

/// Participant management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/participants",
            post(register_participant).get(list_participants),
        )
        .route("/participants/search", get(search_participants))
        .route(
            "/participants/{id}",
            get(get_participant)
                .put(update_participant)
                .delete(delete_participant),
        )
        .route(
            "/participants/{id}/events/{event_id}",
            post(join_event).delete(leave_event),
        )
}
