//! Type-safe identifiers for events and participants.
//!
//! Both are newtype wrappers around [`uuid::Uuid`] (v4) so the two id
//! spaces cannot be confused with each other or with owner ids.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

/// Unique identifier for an event.
///
/// Generated once at event creation time and immutable thereafter. Used
/// as the dictionary key in [`super::EventRegistry`] and as the value
/// stored in each participant's membership set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct EventId(uuid::Uuid);

/// Unique identifier for a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ParticipantId(uuid::Uuid);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wraps an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Parses a caller-supplied string.
            ///
            /// # Errors
            ///
            /// Returns [`ApiError::InvalidIdFormat`] if the string is not
            /// a valid UUID.
            pub fn parse(raw: &str) -> Result<Self, ApiError> {
                raw.parse::<uuid::Uuid>()
                    .map(Self)
                    .map_err(|_| ApiError::InvalidIdFormat(raw.to_string()))
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

impl_id!(EventId);
impl_id!(ParticipantId);

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(EventId::new(), EventId::new());
        assert_ne!(ParticipantId::new(), ParticipantId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let id = EventId::new();
        let s = format!("{id}");
        assert_eq!(s.len(), 36); // UUID string length
        assert!(s.contains('-'));
    }

    #[test]
    fn parse_round_trips_display() {
        let id = ParticipantId::new();
        let parsed = ParticipantId::parse(&id.to_string());
        let Ok(parsed) = parsed else {
            panic!("parse failed");
        };
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        let result = EventId::parse("not-a-uuid");
        assert!(matches!(result, Err(ApiError::InvalidIdFormat(_))));
    }

    #[test]
    fn serde_round_trip() {
        let id = EventId::new();
        let json = serde_json::to_string(&id).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        let deserialized: EventId = serde_json::from_str(&json).ok().unwrap_or_else(|| {
            panic!("deserialization failed");
        });
        assert_eq!(id, deserialized);
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let id = EventId::new();
        let mut map = HashMap::new();
        map.insert(id, "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }
}
