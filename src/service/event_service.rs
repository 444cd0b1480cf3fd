//! Event service: CRUD with name and date-range validation.

use std::sync::Arc;

use crate::domain::event::{EventPatch, EventSummary, NewEvent};
use crate::domain::{EventId, EventRecord, EventRegistry};
use crate::error::ApiError;
use crate::persistence::PostgresPersistence;

/// Validation and CRUD for events.
///
/// Name uniqueness and the `start < end` invariant are enforced here,
/// before anything touches the registry. Deletion is not on this
/// service: removing an event cascades through participant memberships
/// and therefore belongs to the registration service.
#[derive(Debug, Clone)]
pub struct EventService {
    events: Arc<EventRegistry>,
    persistence: Option<PostgresPersistence>,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub fn new(events: Arc<EventRegistry>, persistence: Option<PostgresPersistence>) -> Self {
        Self {
            events,
            persistence,
        }
    }

    /// Returns summaries of all events.
    pub async fn list_events(&self) -> Vec<EventSummary> {
        self.events.list().await
    }

    /// Returns the full record for one event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if the event does not exist.
    pub async fn get_event(&self, event_id: EventId) -> Result<EventRecord, ApiError> {
        let entry = self.events.get(event_id).await?;
        let record = entry.read().await.clone();
        Ok(record)
    }

    /// Looks up an event by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if no event carries the name.
    pub async fn find_by_name(&self, name: &str) -> Result<EventRecord, ApiError> {
        let entry = self
            .events
            .find_by_name(name)
            .await
            .ok_or_else(|| ApiError::EventNotFound(name.to_string()))?;
        let record = entry.read().await.clone();
        Ok(record)
    }

    /// Returns summaries of all events owned by the given user.
    pub async fn events_by_owner(&self, owner_id: uuid::Uuid) -> Vec<EventSummary> {
        self.events.find_by_owner(owner_id).await
    }

    /// Creates a new event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidDateRange`] if `start_date` is not
    /// strictly before `end_date`, or [`ApiError::NameConflict`] if
    /// another event already holds the name. Nothing is persisted on
    /// failure.
    pub async fn create_event(&self, input: NewEvent) -> Result<EventRecord, ApiError> {
        if input.start_date >= input.end_date {
            return Err(ApiError::InvalidDateRange {
                start: input.start_date.to_rfc3339(),
                end: input.end_date.to_rfc3339(),
            });
        }

        if self.events.find_by_name(&input.name).await.is_some() {
            return Err(ApiError::NameConflict(input.name));
        }

        let record = EventRecord::new(input);
        let event_id = self.events.insert(record.clone()).await?;
        self.persist(&record).await;

        tracing::info!(%event_id, name = %record.name, capacity = record.capacity, "event created");
        Ok(record)
    }

    /// Applies a partial patch to an existing event.
    ///
    /// The date-range invariant is validated against the effective pair:
    /// patched values where given, stored values otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if the event does not exist,
    /// [`ApiError::InvalidDateRange`] if the effective dates are
    /// inverted, or [`ApiError::NameConflict`] if renaming onto another
    /// event's name.
    pub async fn update_event(
        &self,
        event_id: EventId,
        patch: EventPatch,
    ) -> Result<EventRecord, ApiError> {
        let entry = self.events.get(event_id).await?;

        let (current_name, current_start, current_end) = {
            let record = entry.read().await;
            (record.name.clone(), record.start_date, record.end_date)
        };

        let effective_start = patch.start_date.unwrap_or(current_start);
        let effective_end = patch.end_date.unwrap_or(current_end);
        if effective_start >= effective_end {
            return Err(ApiError::InvalidDateRange {
                start: effective_start.to_rfc3339(),
                end: effective_end.to_rfc3339(),
            });
        }

        if let Some(new_name) = &patch.name
            && *new_name != current_name
        {
            let taken = match self.events.find_by_name(new_name).await {
                Some(other) => other.read().await.event_id != event_id,
                None => false,
            };
            if taken {
                return Err(ApiError::NameConflict(new_name.clone()));
            }
        }

        let record = {
            let mut record = entry.write().await;
            record.apply(patch);
            record.clone()
        };
        self.persist(&record).await;

        tracing::info!(%event_id, "event updated");
        Ok(record)
    }

    /// Best-effort snapshot write; the in-memory registry stays the
    /// system of record.
    async fn persist(&self, record: &EventRecord) {
        if let Some(db) = &self.persistence {
            if let Err(err) = db.upsert_event(record).await {
                tracing::warn!(event_id = %record.event_id, %err, "event snapshot write failed");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn make_service() -> EventService {
        EventService::new(Arc::new(EventRegistry::new()), None)
    }

    fn make_input(name: &str) -> NewEvent {
        NewEvent {
            owner_id: uuid::Uuid::new_v4(),
            name: name.to_string(),
            description: "desc".to_string(),
            start_date: Utc::now() + Duration::days(1),
            end_date: Utc::now() + Duration::days(2),
            capacity: 100,
            price: Some(10.0),
        }
    }

    #[tokio::test]
    async fn create_starts_with_full_inventory() {
        let service = make_service();
        let result = service.create_event(make_input("a")).await;
        let Ok(record) = result else {
            panic!("create failed");
        };
        assert_eq!(record.tickets_remaining, 100);
        assert_eq!(record.capacity, 100);
    }

    #[tokio::test]
    async fn duplicate_name_fails_with_conflict() {
        let service = make_service();
        let _ = service.create_event(make_input("Tech Conf")).await;

        let result = service.create_event(make_input("Tech Conf")).await;
        assert!(matches!(result, Err(ApiError::NameConflict(_))));
        assert_eq!(service.list_events().await.len(), 1);
    }

    #[tokio::test]
    async fn inverted_dates_fail_before_any_persistence() {
        let service = make_service();
        let mut input = make_input("a");
        input.start_date = Utc::now() + Duration::days(2);
        input.end_date = Utc::now() + Duration::days(1);

        let result = service.create_event(input).await;
        assert!(matches!(result, Err(ApiError::InvalidDateRange { .. })));
        assert!(service.list_events().await.is_empty());
    }

    #[tokio::test]
    async fn equal_dates_are_rejected() {
        let service = make_service();
        let mut input = make_input("a");
        let instant = Utc::now() + Duration::days(1);
        input.start_date = instant;
        input.end_date = instant;

        let result = service.create_event(input).await;
        assert!(matches!(result, Err(ApiError::InvalidDateRange { .. })));
    }

    #[tokio::test]
    async fn update_validates_effective_date_pair() {
        let service = make_service();
        let created = service.create_event(make_input("a")).await;
        let Ok(created) = created else {
            panic!("create failed");
        };

        // Patch only the start date to sit after the stored end date.
        let result = service
            .update_event(
                created.event_id,
                EventPatch {
                    start_date: Some(created.end_date + Duration::days(1)),
                    ..EventPatch::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::InvalidDateRange { .. })));
    }

    #[tokio::test]
    async fn update_rename_onto_taken_name_fails() {
        let service = make_service();
        let _ = service.create_event(make_input("a")).await;
        let created = service.create_event(make_input("b")).await;
        let Ok(created) = created else {
            panic!("create failed");
        };

        let result = service
            .update_event(
                created.event_id,
                EventPatch {
                    name: Some("a".to_string()),
                    ..EventPatch::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::NameConflict(_))));
    }

    #[tokio::test]
    async fn update_keeping_own_name_is_allowed() {
        let service = make_service();
        let created = service.create_event(make_input("a")).await;
        let Ok(created) = created else {
            panic!("create failed");
        };

        let result = service
            .update_event(
                created.event_id,
                EventPatch {
                    name: Some("a".to_string()),
                    description: Some("new".to_string()),
                    ..EventPatch::default()
                },
            )
            .await;
        let Ok(updated) = result else {
            panic!("update failed");
        };
        assert_eq!(updated.description, "new");
    }

    #[tokio::test]
    async fn find_by_name_miss_is_not_found() {
        let service = make_service();
        let result = service.find_by_name("ghost").await;
        assert!(matches!(result, Err(ApiError::EventNotFound(_))));
    }
}
