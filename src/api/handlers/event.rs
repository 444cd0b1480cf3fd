//! Event CRUD handlers: create, list, search, get, update, delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::dto::{
    CreateEventRequest, EventListResponse, EventResponse, EventSummaryDto, PaginationParams,
    ParticipantResponse, UpdateEventRequest, paginate,
};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::domain::event::{EventPatch, NewEvent};
use crate::error::{ApiError, ErrorResponse};

/// Query parameters for `GET /events/search`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchEventParams {
    /// Exact event name to look up.
    pub name: String,
}

/// `POST /events` — Create a new event.
///
/// # Errors
///
/// Returns [`ApiError`] on validation failure or name conflict.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create a new event",
    description = "Creates an event with a fixed ticket capacity. The name must be unique and the start date strictly before the end date.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created successfully", body = EventResponse),
        (status = 400, description = "Invalid dates or capacity", body = ErrorResponse),
        (status = 409, description = "Event name already taken", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = NewEvent::try_from(req)?;
    let record = state.event_service.create_event(input).await?;
    Ok((StatusCode::CREATED, Json(EventResponse::from(record))))
}

/// `GET /events` — List all events with pagination.
///
/// # Errors
///
/// Returns [`ApiError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    description = "Returns a paginated list of all events.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated event list", body = EventListResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let summaries = state.event_service.list_events().await;
    let (page, pagination) = paginate(summaries, &params);
    Ok(Json(EventListResponse {
        data: page.into_iter().map(EventSummaryDto::from).collect(),
        pagination,
    }))
}

/// `GET /events/search` — Look up an event by exact name.
///
/// # Errors
///
/// Returns [`ApiError::EventNotFound`] if no event carries the name.
#[utoipa::path(
    get,
    path = "/api/v1/events/search",
    tag = "Events",
    summary = "Search event by name",
    params(SearchEventParams),
    responses(
        (status = 200, description = "Matching event", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn search_event(
    State(state): State<AppState>,
    Query(params): Query<SearchEventParams>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.event_service.find_by_name(&params.name).await?;
    Ok(Json(EventResponse::from(record)))
}

/// `GET /events/:id` — Get event details.
///
/// # Errors
///
/// Returns [`ApiError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get event details",
    params(
        ("id" = String, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = EventId::parse(&id)?;
    let record = state.event_service.get_event(event_id).await?;
    Ok(Json(EventResponse::from(record)))
}

/// `PUT /events/:id` — Apply a partial field patch.
///
/// # Errors
///
/// Returns [`ApiError`] if the event is missing, the effective date pair
/// is inverted, or the new name is taken.
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Update an event",
    params(
        ("id" = String, Path, description = "Event UUID"),
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = EventResponse),
        (status = 400, description = "Malformed id or invalid dates", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Event name already taken", body = ErrorResponse),
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = EventId::parse(&id)?;
    let patch = EventPatch::try_from(req)?;
    let record = state.event_service.update_event(event_id, patch).await?;
    Ok(Json(EventResponse::from(record)))
}

/// `DELETE /events/:id` — Delete an event, cascading through
/// memberships.
///
/// # Errors
///
/// Returns [`ApiError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Delete an event",
    description = "Deletes the event. Participants registered only for this event are removed entirely; others are detached.",
    params(
        ("id" = String, Path, description = "Event UUID"),
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = EventId::parse(&id)?;
    let _ = state.registration_service.delete_event(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /events/:id/participants` — List an event's participants.
///
/// # Errors
///
/// Returns [`ApiError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/participants",
    tag = "Events",
    summary = "List event participants",
    params(
        ("id" = String, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Registered participants", body = Vec<ParticipantResponse>),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn event_participants(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = EventId::parse(&id)?;
    let records = state
        .registration_service
        .event_participants(event_id)
        .await?;
    let data: Vec<ParticipantResponse> =
        records.into_iter().map(ParticipantResponse::from).collect();
    Ok(Json(data))
}

/// `GET /events/owner/:owner_id` — List events owned by a user.
///
/// # Errors
///
/// Returns [`ApiError::InvalidIdFormat`] on a malformed owner id.
#[utoipa::path(
    get,
    path = "/api/v1/events/owner/{owner_id}",
    tag = "Events",
    summary = "List events by owner",
    params(
        ("owner_id" = String, Path, description = "Owner user UUID"),
    ),
    responses(
        (status = 200, description = "Events owned by the user", body = Vec<EventSummaryDto>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
    )
)]
pub async fn events_by_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id: uuid::Uuid = owner_id
        .parse()
        .map_err(|_| ApiError::InvalidIdFormat(owner_id))?;
    let summaries = state.event_service.events_by_owner(owner_id).await;
    let data: Vec<EventSummaryDto> = summaries.into_iter().map(EventSummaryDto::from).collect();
    Ok(Json(data))
}

/// Event management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            axum::routing::post(create_event).get(list_events),
        )
        .route("/events/search", get(search_event))
        .route("/events/owner/{owner_id}", get(events_by_owner))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/{id}/participants", get(event_participants))
}
