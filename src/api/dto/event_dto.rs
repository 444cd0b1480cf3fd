//! Event-related DTOs for create, update, get, and list operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::EventId;
use crate::domain::event::{EventPatch, EventRecord, EventSummary, NewEvent};
use crate::error::ApiError;

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Owner (organizer) user id.
    pub owner_id: uuid::Uuid,
    /// Event name, unique across all events.
    pub name: String,
    /// Event description.
    pub description: String,
    /// Start of the event.
    pub start_date: DateTime<Utc>,
    /// End of the event.
    pub end_date: DateTime<Utc>,
    /// Ticket capacity. Must be non-negative.
    pub capacity: i64,
    /// Optional ticket price.
    #[serde(default)]
    pub price: Option<f64>,
}

impl TryFrom<CreateEventRequest> for NewEvent {
    type Error = ApiError;

    fn try_from(req: CreateEventRequest) -> Result<Self, Self::Error> {
        if req.name.trim().is_empty() {
            return Err(ApiError::InvalidRequest("event name is empty".to_string()));
        }
        let capacity = u32::try_from(req.capacity).map_err(|_| {
            ApiError::InvalidRequest(format!("capacity must be non-negative: {}", req.capacity))
        })?;
        Ok(Self {
            owner_id: req.owner_id,
            name: req.name,
            description: req.description,
            start_date: req.start_date,
            end_date: req.end_date,
            capacity,
            price: req.price,
        })
    }
}

/// Request body for `PUT /events/{id}`. All fields optional; capacity
/// is fixed at creation and cannot be patched.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    /// New name, if changing.
    #[serde(default)]
    pub name: Option<String>,
    /// New description, if changing.
    #[serde(default)]
    pub description: Option<String>,
    /// New start date, if changing.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// New end date, if changing.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// New price, if changing.
    #[serde(default)]
    pub price: Option<f64>,
}

impl TryFrom<UpdateEventRequest> for EventPatch {
    type Error = ApiError;

    fn try_from(req: UpdateEventRequest) -> Result<Self, Self::Error> {
        if let Some(name) = &req.name
            && name.trim().is_empty()
        {
            return Err(ApiError::InvalidRequest("event name is empty".to_string()));
        }
        Ok(Self {
            name: req.name,
            description: req.description,
            start_date: req.start_date,
            end_date: req.end_date,
            price: req.price,
        })
    }
}

/// Full event representation.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    /// Event identifier.
    pub event_id: EventId,
    /// Owner user id.
    pub owner_id: uuid::Uuid,
    /// Event name.
    pub name: String,
    /// Event description.
    pub description: String,
    /// Start of the event.
    pub start_date: DateTime<Utc>,
    /// End of the event.
    pub end_date: DateTime<Utc>,
    /// Ticket capacity.
    pub capacity: u32,
    /// Tickets still available.
    pub tickets_remaining: u32,
    /// Optional ticket price.
    pub price: Option<f64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<EventRecord> for EventResponse {
    fn from(record: EventRecord) -> Self {
        Self {
            event_id: record.event_id,
            owner_id: record.owner_id,
            name: record.name,
            description: record.description,
            start_date: record.start_date,
            end_date: record.end_date,
            capacity: record.capacity,
            tickets_remaining: record.tickets_remaining,
            price: record.price,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Event summary for list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventSummaryDto {
    /// Event identifier.
    pub event_id: EventId,
    /// Owner user id.
    pub owner_id: uuid::Uuid,
    /// Event name.
    pub name: String,
    /// Start of the event.
    pub start_date: DateTime<Utc>,
    /// End of the event.
    pub end_date: DateTime<Utc>,
    /// Ticket capacity.
    pub capacity: u32,
    /// Tickets still available.
    pub tickets_remaining: u32,
}

impl From<EventSummary> for EventSummaryDto {
    fn from(summary: EventSummary) -> Self {
        Self {
            event_id: summary.event_id,
            owner_id: summary.owner_id,
            name: summary.name,
            start_date: summary.start_date,
            end_date: summary.end_date,
            capacity: summary.capacity,
            tickets_remaining: summary.tickets_remaining,
        }
    }
}

/// Paginated list response for `GET /events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Event summaries.
    pub data: Vec<EventSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_request(capacity: i64) -> CreateEventRequest {
        CreateEventRequest {
            owner_id: uuid::Uuid::new_v4(),
            name: "a".to_string(),
            description: "desc".to_string(),
            start_date: Utc::now(),
            end_date: Utc::now() + Duration::days(1),
            capacity,
            price: None,
        }
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let result = NewEvent::try_from(make_request(-1));
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn zero_capacity_is_allowed() {
        let result = NewEvent::try_from(make_request(0));
        assert!(result.is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut req = make_request(10);
        req.name = "   ".to_string();
        let result = NewEvent::try_from(req);
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }
}
