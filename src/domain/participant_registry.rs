//! Concurrent participant storage with membership set operations.
//!
//! [`ParticipantRegistry`] mirrors the event registry layout: an outer
//! `RwLock<HashMap>` with per-entry locks. Membership mutations are
//! idempotent-safe set operations that report whether anything changed;
//! the registration service decides whether a no-op is a conflict.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::participant::ParticipantRecord;
use super::{EventId, ParticipantId};
use crate::error::ApiError;

/// Central store for all participants.
#[derive(Debug)]
pub struct ParticipantRegistry {
    participants: RwLock<HashMap<ParticipantId, Arc<RwLock<ParticipantRecord>>>>,
}

impl ParticipantRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            participants: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new participant record.
    ///
    /// Email uniqueness is a service-level policy checked before this
    /// call; the duplicate-id check here is defense in depth only.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if a participant with the
    /// same id already exists (should never happen with UUID v4).
    pub async fn insert(&self, record: ParticipantRecord) -> Result<ParticipantId, ApiError> {
        let participant_id = record.participant_id;
        let mut map = self.participants.write().await;
        if map.contains_key(&participant_id) {
            return Err(ApiError::InvalidRequest(format!(
                "participant {participant_id} already exists"
            )));
        }
        map.insert(participant_id, Arc::new(RwLock::new(record)));
        Ok(participant_id)
    }

    /// Returns a shared reference to the participant entry behind its
    /// lock.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ParticipantNotFound`] if no participant with
    /// the given id exists.
    pub async fn get(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Arc<RwLock<ParticipantRecord>>, ApiError> {
        let map = self.participants.read().await;
        map.get(&participant_id)
            .cloned()
            .ok_or_else(|| ApiError::ParticipantNotFound(participant_id.to_string()))
    }

    /// Removes a participant, returning its final record state.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ParticipantNotFound`] if no participant with
    /// the given id exists.
    pub async fn remove(&self, participant_id: ParticipantId) -> Result<ParticipantRecord, ApiError> {
        let arc = {
            let mut map = self.participants.write().await;
            map.remove(&participant_id)
                .ok_or_else(|| ApiError::ParticipantNotFound(participant_id.to_string()))?
        };
        let record = arc.read().await.clone();
        Ok(record)
    }

    /// Looks up a participant by email. Absence is a plain `None`.
    pub async fn find_by_email(&self, email: &str) -> Option<Arc<RwLock<ParticipantRecord>>> {
        let map = self.participants.read().await;
        for entry in map.values() {
            if entry.read().await.email == email {
                return Some(Arc::clone(entry));
            }
        }
        None
    }

    /// Adds an event membership if absent. Returns `true` when the set
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ParticipantNotFound`] if no participant with
    /// the given id exists.
    pub async fn add_membership(
        &self,
        participant_id: ParticipantId,
        event_id: EventId,
    ) -> Result<bool, ApiError> {
        let entry = self.get(participant_id).await?;
        let mut record = entry.write().await;
        let changed = record.events.insert(event_id);
        if changed {
            record.updated_at = chrono::Utc::now();
        }
        Ok(changed)
    }

    /// Removes an event membership if present. Returns `true` when the
    /// set changed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ParticipantNotFound`] if no participant with
    /// the given id exists.
    pub async fn remove_membership(
        &self,
        participant_id: ParticipantId,
        event_id: EventId,
    ) -> Result<bool, ApiError> {
        let entry = self.get(participant_id).await?;
        let mut record = entry.write().await;
        let changed = record.events.remove(&event_id);
        if changed {
            record.updated_at = chrono::Utc::now();
        }
        Ok(changed)
    }

    /// Returns clones of all participants registered for the given
    /// event.
    pub async fn find_by_event(&self, event_id: EventId) -> Vec<ParticipantRecord> {
        let map = self.participants.read().await;
        let mut records = Vec::new();
        for entry in map.values() {
            let record = entry.read().await;
            if record.events.contains(&event_id) {
                records.push(record.clone());
            }
        }
        records
    }

    /// Batch variant of [`Self::find_by_event`]: participants registered
    /// for any of the given events, each returned once.
    pub async fn find_by_events(&self, event_ids: &[EventId]) -> Vec<ParticipantRecord> {
        let map = self.participants.read().await;
        let mut records = Vec::new();
        for entry in map.values() {
            let record = entry.read().await;
            if event_ids.iter().any(|id| record.events.contains(id)) {
                records.push(record.clone());
            }
        }
        records
    }

    /// Counts current memberships for the given event.
    pub async fn count_for_event(&self, event_id: EventId) -> u32 {
        let map = self.participants.read().await;
        let mut count: u32 = 0;
        for entry in map.values() {
            if entry.read().await.events.contains(&event_id) {
                count = count.saturating_add(1);
            }
        }
        count
    }

    /// Case-insensitive substring search over "first last" names.
    pub async fn search_by_name(&self, query: &str) -> Vec<ParticipantRecord> {
        let needle = query.to_lowercase();
        let map = self.participants.read().await;
        let mut records = Vec::new();
        for entry in map.values() {
            let record = entry.read().await;
            if record.full_name().to_lowercase().contains(&needle) {
                records.push(record.clone());
            }
        }
        records
    }

    /// Returns full clones of all participant records.
    pub async fn list(&self) -> Vec<ParticipantRecord> {
        let map = self.participants.read().await;
        let mut records = Vec::with_capacity(map.len());
        for entry in map.values() {
            records.push(entry.read().await.clone());
        }
        records
    }

    /// Returns the number of participants in the registry.
    pub async fn len(&self) -> usize {
        self.participants.read().await.len()
    }

    /// Returns `true` if the registry contains no participants.
    pub async fn is_empty(&self) -> bool {
        self.participants.read().await.is_empty()
    }
}

impl Default for ParticipantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::participant::NewParticipant;
    use std::collections::HashSet;

    fn make_record(first: &str, last: &str, email: &str) -> ParticipantRecord {
        ParticipantRecord::new(
            NewParticipant {
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: email.to_string(),
                phone: "+33612345678".to_string(),
                organization: None,
                age: None,
                gender: None,
            },
            HashSet::new(),
        )
    }

    #[tokio::test]
    async fn insert_and_find_by_email() {
        let registry = ParticipantRegistry::new();
        let _ = registry
            .insert(make_record("John", "Doe", "john@example.com"))
            .await;

        assert!(registry.find_by_email("john@example.com").await.is_some());
        assert!(registry.find_by_email("jane@example.com").await.is_none());
    }

    #[tokio::test]
    async fn membership_operations_are_idempotent_safe() {
        let registry = ParticipantRegistry::new();
        let record = make_record("John", "Doe", "john@example.com");
        let pid = record.participant_id;
        let _ = registry.insert(record).await;
        let event_id = EventId::new();

        let added = registry.add_membership(pid, event_id).await;
        assert_eq!(added.ok(), Some(true));

        // Adding again is a data-layer no-op, not an error.
        let added = registry.add_membership(pid, event_id).await;
        assert_eq!(added.ok(), Some(false));

        let removed = registry.remove_membership(pid, event_id).await;
        assert_eq!(removed.ok(), Some(true));

        let removed = registry.remove_membership(pid, event_id).await;
        assert_eq!(removed.ok(), Some(false));
    }

    #[tokio::test]
    async fn count_and_find_by_event() {
        let registry = ParticipantRegistry::new();
        let event_id = EventId::new();

        for i in 0..3 {
            let record = make_record("P", "Q", &format!("p{i}@example.com"));
            let pid = record.participant_id;
            let _ = registry.insert(record).await;
            let _ = registry.add_membership(pid, event_id).await;
        }
        let outsider = make_record("X", "Y", "x@example.com");
        let _ = registry.insert(outsider).await;

        assert_eq!(registry.count_for_event(event_id).await, 3);
        assert_eq!(registry.find_by_event(event_id).await.len(), 3);
    }

    #[tokio::test]
    async fn find_by_events_returns_each_participant_once() {
        let registry = ParticipantRegistry::new();
        let first = EventId::new();
        let second = EventId::new();

        let record = make_record("John", "Doe", "john@example.com");
        let pid = record.participant_id;
        let _ = registry.insert(record).await;
        let _ = registry.add_membership(pid, first).await;
        let _ = registry.add_membership(pid, second).await;

        let matches = registry.find_by_events(&[first, second]).await;
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn search_by_name_is_case_insensitive_substring() {
        let registry = ParticipantRegistry::new();
        let _ = registry
            .insert(make_record("John", "Doe", "john@example.com"))
            .await;
        let _ = registry
            .insert(make_record("Jane", "Dorian", "jane@example.com"))
            .await;

        assert_eq!(registry.search_by_name("do").await.len(), 2);
        assert_eq!(registry.search_by_name("JOHN D").await.len(), 1);
        assert!(registry.search_by_name("smith").await.is_empty());
    }

    #[tokio::test]
    async fn remove_missing_returns_not_found() {
        let registry = ParticipantRegistry::new();
        let result = registry.remove(ParticipantId::new()).await;
        assert!(matches!(result, Err(ApiError::ParticipantNotFound(_))));
    }
}
