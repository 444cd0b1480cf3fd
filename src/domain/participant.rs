//! Participant record and its creation/patch inputs.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, ParticipantId};

/// A person identified uniquely by email, registered for zero or more
/// events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Unique participant identifier.
    pub participant_id: ParticipantId,

    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Email address, unique across all participants. The natural
    /// identity key for deduplication.
    pub email: String,

    /// Phone number.
    pub phone: String,

    /// Optional organization.
    pub organization: Option<String>,

    /// Optional age (0–120, validated at the service boundary).
    pub age: Option<u8>,

    /// Optional gender.
    pub gender: Option<String>,

    /// Events this participant is registered for.
    pub events: HashSet<EventId>,

    /// Creation timestamp, doubles as the registration date on exports.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a new participant.
#[derive(Debug, Clone)]
pub struct NewParticipant {
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
}

/// Partial field patch for an existing participant.
#[derive(Debug, Clone, Default)]
pub struct ParticipantPatch {
    /// New first name, if changing.
    pub first_name: Option<String>,
    /// New last name, if changing.
    pub last_name: Option<String>,
    /// New email, if changing (uniqueness checked by the service).
    pub email: Option<String>,
    /// New phone number, if changing.
    pub phone: Option<String>,
    /// New organization, if changing.
    pub organization: Option<String>,
    /// New age, if changing.
    pub age: Option<u8>,
    /// New gender, if changing.
    pub gender: Option<String>,
}

impl ParticipantRecord {
    /// Creates a fresh record with the given initial memberships.
    #[must_use]
    pub fn new(input: NewParticipant, events: HashSet<EventId>) -> Self {
        let now = Utc::now();
        Self {
            participant_id: ParticipantId::new(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            organization: input.organization,
            age: input.age,
            gender: input.gender,
            events,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial patch in place and bumps `updated_at`.
    pub fn apply(&mut self, patch: ParticipantPatch) {
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(organization) = patch.organization {
            self.organization = Some(organization);
        }
        if let Some(age) = patch.age {
            self.age = Some(age);
        }
        if let Some(gender) = patch.gender {
            self.gender = Some(gender);
        }
        self.updated_at = Utc::now();
    }

    /// Full display name, used by the case-insensitive name search.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
