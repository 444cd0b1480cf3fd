//! Event record and its creation/patch inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EventId;

/// A time-bounded activity with a ticket capacity, owned by a user.
///
/// `tickets_remaining` is stored redundantly with the membership sets
/// held on participant records. The registration service keeps the two
/// in sync on every mutation path; readers use the stored value as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique event identifier (immutable after creation).
    pub event_id: EventId,

    /// Owner (organizer) user id. Users are managed outside this service.
    pub owner_id: uuid::Uuid,

    /// Event name, unique across all events.
    pub name: String,

    /// Free-form event description.
    pub description: String,

    /// Start of the event. Invariant: strictly before `end_date`.
    pub start_date: DateTime<Utc>,

    /// End of the event.
    pub end_date: DateTime<Utc>,

    /// Maximum number of tickets (immutable after creation).
    pub capacity: u32,

    /// Tickets still available: `capacity - |members|` after every
    /// settled mutation.
    pub tickets_remaining: u32,

    /// Optional ticket price.
    pub price: Option<f64>,

    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last mutation, including ticket resyncs.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a new event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Owner user id.
    pub owner_id: uuid::Uuid,
    /// Event name.
    pub name: String,
    /// Event description.
    pub description: String,
    /// Start date.
    pub start_date: DateTime<Utc>,
    /// End date.
    pub end_date: DateTime<Utc>,
    /// Ticket capacity.
    pub capacity: u32,
    /// Optional ticket price.
    pub price: Option<f64>,
}

/// Partial field patch for an existing event.
///
/// `capacity` is deliberately absent: ticket capacity is fixed at
/// creation time.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    /// New name, if changing.
    pub name: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New start date, if changing.
    pub start_date: Option<DateTime<Utc>>,
    /// New end date, if changing.
    pub end_date: Option<DateTime<Utc>>,
    /// New price, if changing.
    pub price: Option<f64>,
}

impl EventRecord {
    /// Creates a fresh record from validated input. All tickets start
    /// unsold.
    #[must_use]
    pub fn new(input: NewEvent) -> Self {
        let now = Utc::now();
        Self {
            event_id: EventId::new(),
            owner_id: input.owner_id,
            name: input.name,
            description: input.description,
            start_date: input.start_date,
            end_date: input.end_date,
            capacity: input.capacity,
            tickets_remaining: input.capacity,
            price: input.price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial patch in place and bumps `updated_at`.
    pub fn apply(&mut self, patch: EventPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(price) = patch.price {
            self.price = Some(price);
        }
        self.updated_at = Utc::now();
    }
}

/// Lightweight summary of an event for list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    /// Event identifier.
    pub event_id: EventId,
    /// Owner user id.
    pub owner_id: uuid::Uuid,
    /// Event name.
    pub name: String,
    /// Start date.
    pub start_date: DateTime<Utc>,
    /// End date.
    pub end_date: DateTime<Utc>,
    /// Ticket capacity.
    pub capacity: u32,
    /// Tickets still available.
    pub tickets_remaining: u32,
}

impl From<&EventRecord> for EventSummary {
    fn from(record: &EventRecord) -> Self {
        Self {
            event_id: record.event_id,
            owner_id: record.owner_id,
            name: record.name.clone(),
            start_date: record.start_date,
            end_date: record.end_date,
            capacity: record.capacity,
            tickets_remaining: record.tickets_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_record() -> EventRecord {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).single();
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).single();
        EventRecord::new(NewEvent {
            owner_id: uuid::Uuid::new_v4(),
            name: "Tech Conference".to_string(),
            description: "Annual gathering".to_string(),
            start_date: start.unwrap_or_default(),
            end_date: end.unwrap_or_default(),
            capacity: 100,
            price: Some(25.0),
        })
    }

    #[test]
    fn new_record_starts_with_full_inventory() {
        let record = make_record();
        assert_eq!(record.tickets_remaining, record.capacity);
    }

    #[test]
    fn apply_patches_only_given_fields() {
        let mut record = make_record();
        let original_start = record.start_date;

        record.apply(EventPatch {
            name: Some("Renamed".to_string()),
            ..EventPatch::default()
        });

        assert_eq!(record.name, "Renamed");
        assert_eq!(record.start_date, original_start);
        assert_eq!(record.capacity, 100);
    }
}
