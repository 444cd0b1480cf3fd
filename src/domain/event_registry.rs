//! Concurrent event storage with per-event fine-grained locking.
//!
//! [`EventRegistry`] stores all events in a `HashMap` where each entry
//! is individually protected by a [`tokio::sync::RwLock`]. Holding an
//! event's write lock across a membership mutation and the following
//! ticket resync serializes concurrent joins on the same event while
//! leaving unrelated events untouched.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::EventId;
use super::event::{EventRecord, EventSummary};
use crate::error::ApiError;

/// Central store for all events.
///
/// Uses a `RwLock<HashMap<...>>` for the outer map and per-entry
/// `Arc<RwLock<EventRecord>>` for fine-grained per-event locking.
///
/// # Concurrency
///
/// - Multiple tasks may read the same event concurrently.
/// - Writes to different events are concurrent.
/// - Writes to the same event are serialized.
#[derive(Debug)]
pub struct EventRegistry {
    events: RwLock<HashMap<EventId, Arc<RwLock<EventRecord>>>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new event record.
    ///
    /// Name uniqueness is a service-level policy checked before this
    /// call; the duplicate-id check here is defense in depth only.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if an event with the same id
    /// already exists (should never happen with UUID v4).
    pub async fn insert(&self, record: EventRecord) -> Result<EventId, ApiError> {
        let event_id = record.event_id;
        let mut map = self.events.write().await;
        if map.contains_key(&event_id) {
            return Err(ApiError::InvalidRequest(format!(
                "event {event_id} already exists"
            )));
        }
        map.insert(event_id, Arc::new(RwLock::new(record)));
        Ok(event_id)
    }

    /// Returns a shared reference to the event entry behind its lock.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if no event with the given id
    /// exists.
    pub async fn get(&self, event_id: EventId) -> Result<Arc<RwLock<EventRecord>>, ApiError> {
        let map = self.events.read().await;
        map.get(&event_id)
            .cloned()
            .ok_or_else(|| ApiError::EventNotFound(event_id.to_string()))
    }

    /// Removes an event, returning its final record state.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if no event with the given id
    /// exists.
    pub async fn remove(&self, event_id: EventId) -> Result<EventRecord, ApiError> {
        let arc = {
            let mut map = self.events.write().await;
            map.remove(&event_id)
                .ok_or_else(|| ApiError::EventNotFound(event_id.to_string()))?
        };
        let record = arc.read().await.clone();
        Ok(record)
    }

    /// Looks up an event by exact name. Absence is a plain `None`; the
    /// caller decides whether that is a miss or a free slot.
    pub async fn find_by_name(&self, name: &str) -> Option<Arc<RwLock<EventRecord>>> {
        let map = self.events.read().await;
        for entry in map.values() {
            if entry.read().await.name == name {
                return Some(Arc::clone(entry));
            }
        }
        None
    }

    /// Returns summaries of all events owned by the given user.
    pub async fn find_by_owner(&self, owner_id: uuid::Uuid) -> Vec<EventSummary> {
        let map = self.events.read().await;
        let mut summaries = Vec::new();
        for entry in map.values() {
            let record = entry.read().await;
            if record.owner_id == owner_id {
                summaries.push(EventSummary::from(&*record));
            }
        }
        summaries
    }

    /// Returns summaries of all events.
    pub async fn list(&self) -> Vec<EventSummary> {
        let map = self.events.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry in map.values() {
            let record = entry.read().await;
            summaries.push(EventSummary::from(&*record));
        }
        summaries
    }

    /// Returns full clones of all event records.
    pub async fn snapshot(&self) -> Vec<EventRecord> {
        let map = self.events.read().await;
        let mut records = Vec::with_capacity(map.len());
        for entry in map.values() {
            records.push(entry.read().await.clone());
        }
        records
    }

    /// Returns the number of events in the registry.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns `true` if the registry contains no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::event::NewEvent;
    use chrono::{Duration, Utc};

    fn make_record(name: &str, owner_id: uuid::Uuid) -> EventRecord {
        EventRecord::new(NewEvent {
            owner_id,
            name: name.to_string(),
            description: "desc".to_string(),
            start_date: Utc::now() + Duration::days(1),
            end_date: Utc::now() + Duration::days(2),
            capacity: 50,
            price: None,
        })
    }

    #[tokio::test]
    async fn insert_and_get() {
        let registry = EventRegistry::new();
        let record = make_record("a", uuid::Uuid::new_v4());
        let id = record.event_id;

        let result = registry.insert(record).await;
        assert!(result.is_ok());

        let fetched = registry.get(id).await;
        assert!(fetched.is_ok());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_not_found() {
        let registry = EventRegistry::new();
        let result = registry.get(EventId::new()).await;
        assert!(matches!(result, Err(ApiError::EventNotFound(_))));
    }

    #[tokio::test]
    async fn remove_returns_record_and_forgets_it() {
        let registry = EventRegistry::new();
        let record = make_record("a", uuid::Uuid::new_v4());
        let id = record.event_id;

        let _ = registry.insert(record).await;
        let removed = registry.remove(id).await;
        let Ok(removed) = removed else {
            panic!("remove failed");
        };
        assert_eq!(removed.name, "a");

        let result = registry.get(id).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn find_by_name_is_exact() {
        let registry = EventRegistry::new();
        let _ = registry
            .insert(make_record("Tech Conference", uuid::Uuid::new_v4()))
            .await;

        assert!(registry.find_by_name("Tech Conference").await.is_some());
        assert!(registry.find_by_name("Tech").await.is_none());
        assert!(registry.find_by_name("tech conference").await.is_none());
    }

    #[tokio::test]
    async fn find_by_owner_filters() {
        let registry = EventRegistry::new();
        let owner = uuid::Uuid::new_v4();
        let _ = registry.insert(make_record("a", owner)).await;
        let _ = registry.insert(make_record("b", owner)).await;
        let _ = registry
            .insert(make_record("c", uuid::Uuid::new_v4()))
            .await;

        assert_eq!(registry.find_by_owner(owner).await.len(), 2);
    }

    #[tokio::test]
    async fn len_and_is_empty() {
        let registry = EventRegistry::new();
        assert!(registry.is_empty().await);

        let _ = registry.insert(make_record("a", uuid::Uuid::new_v4())).await;
        assert!(!registry.is_empty().await);
        assert_eq!(registry.len().await, 1);
    }
}
