//! Participant-related DTOs for registration, update, and list
//! operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::participant::{NewParticipant, ParticipantPatch, ParticipantRecord};
use crate::domain::{EventId, ParticipantId};
use crate::error::ApiError;

/// Upper bound accepted for the optional age field.
const MAX_AGE: i64 = 120;

/// Request body for `POST /participants`.
///
/// With `event_id` set this registers the participant for that event
/// (creating or reusing the record by email); without it the call is a
/// lookup-or-create.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterParticipantRequest {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address, the deduplication key.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Optional organization.
    #[serde(default)]
    pub organization: Option<String>,
    /// Optional age (0–120).
    #[serde(default)]
    pub age: Option<i64>,
    /// Optional gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Event to register for, if any.
    #[serde(default)]
    pub event_id: Option<uuid::Uuid>,
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ApiError::InvalidRequest(format!(
            "invalid email address: {email}"
        )));
    }
    Ok(())
}

fn validate_age(age: i64) -> Result<u8, ApiError> {
    if !(0..=MAX_AGE).contains(&age) {
        return Err(ApiError::InvalidRequest(format!(
            "age out of range (0-{MAX_AGE}): {age}"
        )));
    }
    u8::try_from(age).map_err(|_| ApiError::InvalidRequest(format!("age out of range: {age}")))
}

impl TryFrom<RegisterParticipantRequest> for NewParticipant {
    type Error = ApiError;

    fn try_from(req: RegisterParticipantRequest) -> Result<Self, Self::Error> {
        if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                "participant name is empty".to_string(),
            ));
        }
        validate_email(&req.email)?;
        if req.phone.trim().is_empty() {
            return Err(ApiError::InvalidRequest("phone number is empty".to_string()));
        }
        let age = req.age.map(validate_age).transpose()?;
        Ok(Self {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            organization: req.organization,
            age,
            gender: req.gender,
        })
    }
}

/// Request body for `PUT /participants/{id}`. All fields optional.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateParticipantRequest {
    /// New first name, if changing.
    #[serde(default)]
    pub first_name: Option<String>,
    /// New last name, if changing.
    #[serde(default)]
    pub last_name: Option<String>,
    /// New email, if changing.
    #[serde(default)]
    pub email: Option<String>,
    /// New phone number, if changing.
    #[serde(default)]
    pub phone: Option<String>,
    /// New organization, if changing.
    #[serde(default)]
    pub organization: Option<String>,
    /// New age, if changing.
    #[serde(default)]
    pub age: Option<i64>,
    /// New gender, if changing.
    #[serde(default)]
    pub gender: Option<String>,
}

impl TryFrom<UpdateParticipantRequest> for ParticipantPatch {
    type Error = ApiError;

    fn try_from(req: UpdateParticipantRequest) -> Result<Self, Self::Error> {
        if let Some(email) = &req.email {
            validate_email(email)?;
        }
        let age = req.age.map(validate_age).transpose()?;
        Ok(Self {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            organization: req.organization,
            age,
            gender: req.gender,
        })
    }
}

/// Full participant representation.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantResponse {
    /// Participant identifier.
    pub participant_id: ParticipantId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Optional organization.
    pub organization: Option<String>,
    /// Optional age.
    pub age: Option<u8>,
    /// Optional gender.
    pub gender: Option<String>,
    /// Events this participant is registered for.
    pub events: Vec<EventId>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<ParticipantRecord> for ParticipantResponse {
    fn from(record: ParticipantRecord) -> Self {
        let mut events: Vec<EventId> = record.events.into_iter().collect();
        events.sort_by_key(ToString::to_string);
        Self {
            participant_id: record.participant_id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            phone: record.phone,
            organization: record.organization,
            age: record.age,
            gender: record.gender,
            events,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Paginated list response for `GET /participants`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantListResponse {
    /// Participant records.
    pub data: Vec<ParticipantResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
