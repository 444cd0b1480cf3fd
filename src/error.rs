//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "event not found: 3f2a...",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`ApiError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request              |
/// | 2000–2099 | Not Found         | 404 Not Found                |
/// | 2100–2199 | Conflict          | 409 Conflict                 |
/// | 3000–3999 | Server            | 500 Internal Server Error    |
/// | 4000–4999 | Domain-Specific   | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request validation failed (bad field value, out-of-range age,
    /// negative capacity).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A caller-supplied identifier is not a valid UUID.
    #[error("invalid identifier: {0}")]
    InvalidIdFormat(String),

    /// Event start date is not strictly before its end date.
    #[error("invalid date range: start {start} is not before end {end}")]
    InvalidDateRange {
        /// Offending start date (RFC 3339).
        start: String,
        /// Offending end date (RFC 3339).
        end: String,
    },

    /// Event with the given id or name was not found.
    #[error("event not found: {0}")]
    EventNotFound(String),

    /// Participant with the given id or email was not found.
    #[error("participant not found: {0}")]
    ParticipantNotFound(String),

    /// Another event already holds the requested name.
    #[error("event name already taken: {0}")]
    NameConflict(String),

    /// Another participant already holds the requested email.
    #[error("participant email already registered: {0}")]
    EmailConflict(String),

    /// The participant is already a member of the event.
    #[error("participant {participant_id} already registered for event {event_id}")]
    AlreadyRegistered {
        /// Participant that attempted the duplicate join.
        participant_id: String,
        /// Event the membership already exists for.
        event_id: String,
    },

    /// The participant is not a member of the event.
    #[error("participant {participant_id} is not registered for event {event_id}")]
    NotRegistered {
        /// Participant that attempted the leave.
        participant_id: String,
        /// Event no membership exists for.
        event_id: String,
    },

    /// The event has no tickets remaining.
    #[error("event {event_id} is sold out (capacity {capacity})")]
    CapacityExceeded {
        /// Fully booked event.
        event_id: String,
        /// Its immutable ticket capacity.
        capacity: u32,
    },

    /// An export was requested for an event with no participants.
    #[error("no participants to export for event {0}")]
    EmptyExport(String),

    /// Rendering or writing an export artifact failed.
    #[error("export failed: {0}")]
    ExportFailure(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidIdFormat(_) => 1002,
            Self::InvalidDateRange { .. } => 1003,
            Self::EventNotFound(_) => 2001,
            Self::ParticipantNotFound(_) => 2002,
            Self::NameConflict(_) => 2101,
            Self::EmailConflict(_) => 2102,
            Self::AlreadyRegistered { .. } => 2103,
            Self::NotRegistered { .. } => 2104,
            Self::CapacityExceeded { .. } => 4001,
            Self::EmptyExport(_) => 4002,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::ExportFailure(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidIdFormat(_) | Self::InvalidDateRange { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::EventNotFound(_) | Self::ParticipantNotFound(_) => StatusCode::NOT_FOUND,
            Self::NameConflict(_)
            | Self::EmailConflict(_)
            | Self::AlreadyRegistered { .. }
            | Self::NotRegistered { .. } => StatusCode::CONFLICT,
            Self::CapacityExceeded { .. } | Self::EmptyExport(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Internal(_) | Self::PersistenceError(_) | Self::ExportFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
