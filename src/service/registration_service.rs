//! Registration service: membership orchestration and ticket accounting.
//!
//! Owns both registries so the membership relation and the persisted
//! `tickets_remaining` counter are mutated as one logical unit. Every
//! join/leave path acquires the event entry's write lock first and keeps
//! it across the membership mutation and the following resync, which
//! serializes concurrent bookings on the same event. Lock order is
//! always event entry before participant entry; wholesale deletes remove
//! the record from the outer map before touching anything else.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::participant::{NewParticipant, ParticipantPatch};
use crate::domain::{
    EventId, EventRecord, EventRegistry, ParticipantId, ParticipantRecord, ParticipantRegistry,
};
use crate::error::ApiError;
use crate::persistence::PostgresPersistence;

/// Orchestration layer for the participant/event relation.
#[derive(Debug, Clone)]
pub struct RegistrationService {
    events: Arc<EventRegistry>,
    participants: Arc<ParticipantRegistry>,
    persistence: Option<PostgresPersistence>,
}

impl RegistrationService {
    /// Creates a new `RegistrationService`.
    #[must_use]
    pub fn new(
        events: Arc<EventRegistry>,
        participants: Arc<ParticipantRegistry>,
        persistence: Option<PostgresPersistence>,
    ) -> Self {
        Self {
            events,
            participants,
            persistence,
        }
    }

    /// Registers a participant, deduplicated by email.
    ///
    /// Without an event id this is lookup-or-create: an existing record
    /// is returned unchanged, a missing one is created with an empty
    /// membership set. With an event id the membership is added (or the
    /// record created with that single membership) and the event's
    /// ticket counter resynced before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if the event id does not
    /// resolve, [`ApiError::AlreadyRegistered`] if the membership
    /// already exists, or [`ApiError::CapacityExceeded`] if the event is
    /// sold out.
    pub async fn register_participant(
        &self,
        input: NewParticipant,
        event_id: Option<EventId>,
    ) -> Result<ParticipantRecord, ApiError> {
        let Some(event_id) = event_id else {
            if let Some(existing) = self.participants.find_by_email(&input.email).await {
                let record = existing.read().await.clone();
                return Ok(record);
            }
            let record = ParticipantRecord::new(input, HashSet::new());
            let _ = self.participants.insert(record.clone()).await?;
            self.persist_participant(&record).await;
            tracing::info!(participant_id = %record.participant_id, email = %record.email, "participant created");
            return Ok(record);
        };

        let event_entry = self.events.get(event_id).await?;
        let mut event = event_entry.write().await;

        let record = match self.participants.find_by_email(&input.email).await {
            Some(existing) => {
                let participant_id = {
                    let record = existing.read().await;
                    if record.events.contains(&event_id) {
                        return Err(ApiError::AlreadyRegistered {
                            participant_id: record.participant_id.to_string(),
                            event_id: event_id.to_string(),
                        });
                    }
                    record.participant_id
                };
                self.check_capacity(&event).await?;
                let _ = self
                    .participants
                    .add_membership(participant_id, event_id)
                    .await?;
                existing.read().await.clone()
            }
            None => {
                self.check_capacity(&event).await?;
                let record = ParticipantRecord::new(input, HashSet::from([event_id]));
                let _ = self.participants.insert(record.clone()).await?;
                record
            }
        };

        self.resync_tickets(&mut event).await;
        self.persist_event(&event).await;
        self.persist_participant(&record).await;

        tracing::info!(
            participant_id = %record.participant_id,
            %event_id,
            tickets_remaining = event.tickets_remaining,
            "participant registered for event"
        );
        Ok(record)
    }

    /// Adds an existing participant to an event and resyncs its tickets.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] or
    /// [`ApiError::ParticipantNotFound`] if either side is missing,
    /// [`ApiError::AlreadyRegistered`] on a duplicate join, or
    /// [`ApiError::CapacityExceeded`] if the event is sold out.
    pub async fn join_event(
        &self,
        participant_id: ParticipantId,
        event_id: EventId,
    ) -> Result<ParticipantRecord, ApiError> {
        let event_entry = self.events.get(event_id).await?;
        let mut event = event_entry.write().await;

        let participant_entry = self.participants.get(participant_id).await?;
        {
            let record = participant_entry.read().await;
            if record.events.contains(&event_id) {
                return Err(ApiError::AlreadyRegistered {
                    participant_id: participant_id.to_string(),
                    event_id: event_id.to_string(),
                });
            }
        }

        self.check_capacity(&event).await?;
        let _ = self
            .participants
            .add_membership(participant_id, event_id)
            .await?;
        self.resync_tickets(&mut event).await;

        let record = participant_entry.read().await.clone();
        self.persist_event(&event).await;
        self.persist_participant(&record).await;

        tracing::info!(
            %participant_id,
            %event_id,
            tickets_remaining = event.tickets_remaining,
            "participant joined event"
        );
        Ok(record)
    }

    /// Removes a participant from an event and resyncs its tickets.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] or
    /// [`ApiError::ParticipantNotFound`] if either side is missing, or
    /// [`ApiError::NotRegistered`] if no membership exists.
    pub async fn leave_event(
        &self,
        participant_id: ParticipantId,
        event_id: EventId,
    ) -> Result<ParticipantRecord, ApiError> {
        let event_entry = self.events.get(event_id).await?;
        let mut event = event_entry.write().await;

        let changed = self
            .participants
            .remove_membership(participant_id, event_id)
            .await?;
        if !changed {
            return Err(ApiError::NotRegistered {
                participant_id: participant_id.to_string(),
                event_id: event_id.to_string(),
            });
        }

        self.resync_tickets(&mut event).await;

        let participant_entry = self.participants.get(participant_id).await?;
        let record = participant_entry.read().await.clone();
        self.persist_event(&event).await;
        self.persist_participant(&record).await;

        tracing::info!(
            %participant_id,
            %event_id,
            tickets_remaining = event.tickets_remaining,
            "participant left event"
        );
        Ok(record)
    }

    /// Deletes an event and cascades through its memberships.
    ///
    /// Participants whose only membership was this event are removed
    /// entirely; participants with other memberships are just detached.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if the event does not exist.
    pub async fn delete_event(&self, event_id: EventId) -> Result<EventRecord, ApiError> {
        let removed = self.events.remove(event_id).await?;

        let members = self.participants.find_by_event(event_id).await;
        let member_count = members.len();
        for member in members {
            if member.events.len() <= 1 {
                let _ = self.participants.remove(member.participant_id).await?;
                self.persist_participant_delete(member.participant_id).await;
            } else {
                let _ = self
                    .participants
                    .remove_membership(member.participant_id, event_id)
                    .await?;
                if let Ok(entry) = self.participants.get(member.participant_id).await {
                    let record = entry.read().await.clone();
                    self.persist_participant(&record).await;
                }
            }
        }

        self.persist_event_delete(event_id).await;
        tracing::info!(%event_id, members = member_count, "event deleted with cascade");
        Ok(removed)
    }

    /// Deletes a participant wholesale and resyncs every event it was
    /// registered for.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ParticipantNotFound`] if the participant does
    /// not exist.
    pub async fn delete_participant(
        &self,
        participant_id: ParticipantId,
    ) -> Result<ParticipantRecord, ApiError> {
        let removed = self.participants.remove(participant_id).await?;

        for event_id in &removed.events {
            match self.events.get(*event_id).await {
                Ok(entry) => {
                    let mut event = entry.write().await;
                    self.resync_tickets(&mut event).await;
                    self.persist_event(&event).await;
                }
                Err(_) => {
                    tracing::warn!(%participant_id, %event_id, "membership referenced a missing event");
                }
            }
        }

        self.persist_participant_delete(participant_id).await;
        tracing::info!(%participant_id, "participant deleted");
        Ok(removed)
    }

    /// Returns the resolved participant list for an event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if the event does not exist.
    pub async fn event_participants(
        &self,
        event_id: EventId,
    ) -> Result<Vec<ParticipantRecord>, ApiError> {
        let _ = self.events.get(event_id).await?;
        Ok(self.participants.find_by_event(event_id).await)
    }

    /// Returns all participants.
    pub async fn list_participants(&self) -> Vec<ParticipantRecord> {
        self.participants.list().await
    }

    /// Returns one participant by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ParticipantNotFound`] if the participant does
    /// not exist.
    pub async fn get_participant(
        &self,
        participant_id: ParticipantId,
    ) -> Result<ParticipantRecord, ApiError> {
        let entry = self.participants.get(participant_id).await?;
        let record = entry.read().await.clone();
        Ok(record)
    }

    /// Case-insensitive substring search over participant names.
    pub async fn search_participants(&self, query: &str) -> Vec<ParticipantRecord> {
        self.participants.search_by_name(query).await
    }

    /// Applies a partial patch to a participant, enforcing email
    /// uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ParticipantNotFound`] if the participant does
    /// not exist or [`ApiError::EmailConflict`] if the new email belongs
    /// to someone else.
    pub async fn update_participant(
        &self,
        participant_id: ParticipantId,
        patch: ParticipantPatch,
    ) -> Result<ParticipantRecord, ApiError> {
        let entry = self.participants.get(participant_id).await?;

        if let Some(new_email) = &patch.email {
            let taken = match self.participants.find_by_email(new_email).await {
                Some(other) => other.read().await.participant_id != participant_id,
                None => false,
            };
            if taken {
                return Err(ApiError::EmailConflict(new_email.clone()));
            }
        }

        let record = {
            let mut record = entry.write().await;
            record.apply(patch);
            record.clone()
        };
        self.persist_participant(&record).await;

        tracing::info!(%participant_id, "participant updated");
        Ok(record)
    }

    /// Rejects a join that would overbook the event. Called with the
    /// event write lock held, before the membership mutation.
    async fn check_capacity(&self, event: &EventRecord) -> Result<(), ApiError> {
        let count = self.participants.count_for_event(event.event_id).await;
        if count >= event.capacity {
            return Err(ApiError::CapacityExceeded {
                event_id: event.event_id.to_string(),
                capacity: event.capacity,
            });
        }
        Ok(())
    }

    /// Recomputes `tickets_remaining` from the live membership count and
    /// stores it on the locked event record.
    ///
    /// A count above capacity clamps at zero with a warning instead of
    /// persisting a negative number.
    async fn resync_tickets(&self, event: &mut EventRecord) {
        let count = self.participants.count_for_event(event.event_id).await;
        if count > event.capacity {
            tracing::warn!(
                event_id = %event.event_id,
                count,
                capacity = event.capacity,
                "membership count exceeds capacity; clamping tickets at zero"
            );
        }
        event.tickets_remaining = event.capacity.saturating_sub(count);
        event.updated_at = Utc::now();
    }

    async fn persist_event(&self, record: &EventRecord) {
        if let Some(db) = &self.persistence {
            if let Err(err) = db.upsert_event(record).await {
                tracing::warn!(event_id = %record.event_id, %err, "event snapshot write failed");
            }
        }
    }

    async fn persist_event_delete(&self, event_id: EventId) {
        if let Some(db) = &self.persistence {
            if let Err(err) = db.delete_event(event_id).await {
                tracing::warn!(%event_id, %err, "event snapshot delete failed");
            }
        }
    }

    async fn persist_participant(&self, record: &ParticipantRecord) {
        if let Some(db) = &self.persistence {
            if let Err(err) = db.upsert_participant(record).await {
                tracing::warn!(participant_id = %record.participant_id, %err, "participant snapshot write failed");
            }
        }
    }

    async fn persist_participant_delete(&self, participant_id: ParticipantId) {
        if let Some(db) = &self.persistence {
            if let Err(err) = db.delete_participant(participant_id).await {
                tracing::warn!(%participant_id, %err, "participant snapshot delete failed");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::event::NewEvent;
    use chrono::Duration;

    fn make_service() -> RegistrationService {
        RegistrationService::new(
            Arc::new(EventRegistry::new()),
            Arc::new(ParticipantRegistry::new()),
            None,
        )
    }

    async fn seed_event(service: &RegistrationService, name: &str, capacity: u32) -> EventId {
        let record = EventRecord::new(NewEvent {
            owner_id: uuid::Uuid::new_v4(),
            name: name.to_string(),
            description: "desc".to_string(),
            start_date: Utc::now() + Duration::days(1),
            end_date: Utc::now() + Duration::days(2),
            capacity,
            price: None,
        });
        let inserted = service.events.insert(record).await;
        let Ok(event_id) = inserted else {
            panic!("seed insert failed");
        };
        event_id
    }

    fn make_participant(email: &str) -> NewParticipant {
        NewParticipant {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            phone: "+33612345678".to_string(),
            organization: None,
            age: Some(30),
            gender: None,
        }
    }

    async fn tickets_remaining(service: &RegistrationService, event_id: EventId) -> u32 {
        let entry = service.events.get(event_id).await;
        let Ok(entry) = entry else {
            panic!("event missing");
        };
        let remaining = entry.read().await.tickets_remaining;
        remaining
    }

    #[tokio::test]
    async fn register_without_event_is_idempotent_by_email() {
        let service = make_service();

        let first = service
            .register_participant(make_participant("a@example.com"), None)
            .await;
        let second = service
            .register_participant(make_participant("a@example.com"), None)
            .await;

        let (Ok(first), Ok(second)) = (first, second) else {
            panic!("register failed");
        };
        assert_eq!(first.participant_id, second.participant_id);
        assert_eq!(service.participants.len().await, 1);
    }

    #[tokio::test]
    async fn register_with_event_consumes_a_ticket() {
        let service = make_service();
        let event_id = seed_event(&service, "a", 10).await;

        let result = service
            .register_participant(make_participant("a@example.com"), Some(event_id))
            .await;
        assert!(result.is_ok());
        assert_eq!(tickets_remaining(&service, event_id).await, 9);
    }

    #[tokio::test]
    async fn register_existing_email_merges_into_one_record() {
        let service = make_service();
        let first_event = seed_event(&service, "a", 10).await;
        let second_event = seed_event(&service, "b", 10).await;

        let _ = service
            .register_participant(make_participant("a@example.com"), Some(first_event))
            .await;
        let result = service
            .register_participant(make_participant("a@example.com"), Some(second_event))
            .await;

        let Ok(record) = result else {
            panic!("second registration failed");
        };
        assert_eq!(record.events.len(), 2);
        assert_eq!(service.participants.len().await, 1);
        assert_eq!(tickets_remaining(&service, second_event).await, 9);
    }

    #[tokio::test]
    async fn register_for_unknown_event_fails_before_creating_anyone() {
        let service = make_service();

        let result = service
            .register_participant(make_participant("a@example.com"), Some(EventId::new()))
            .await;
        assert!(matches!(result, Err(ApiError::EventNotFound(_))));
        assert!(service.participants.is_empty().await);
    }

    #[tokio::test]
    async fn three_joins_then_one_leave() {
        let service = make_service();
        let event_id = seed_event(&service, "a", 10).await;

        let mut last = None;
        for i in 0..3 {
            let result = service
                .register_participant(
                    make_participant(&format!("p{i}@example.com")),
                    Some(event_id),
                )
                .await;
            let Ok(record) = result else {
                panic!("registration {i} failed");
            };
            last = Some(record.participant_id);
        }
        assert_eq!(tickets_remaining(&service, event_id).await, 7);

        let Some(last) = last else {
            panic!("no registrations");
        };
        let result = service.leave_event(last, event_id).await;
        assert!(result.is_ok());
        assert_eq!(tickets_remaining(&service, event_id).await, 8);
    }

    #[tokio::test]
    async fn duplicate_join_fails_and_counter_is_unchanged() {
        let service = make_service();
        let event_id = seed_event(&service, "a", 10).await;

        let registered = service
            .register_participant(make_participant("a@example.com"), Some(event_id))
            .await;
        let Ok(registered) = registered else {
            panic!("registration failed");
        };

        let result = service.join_event(registered.participant_id, event_id).await;
        assert!(matches!(result, Err(ApiError::AlreadyRegistered { .. })));
        assert_eq!(tickets_remaining(&service, event_id).await, 9);
    }

    #[tokio::test]
    async fn join_full_event_is_rejected() {
        let service = make_service();
        let event_id = seed_event(&service, "a", 1).await;

        let _ = service
            .register_participant(make_participant("a@example.com"), Some(event_id))
            .await;
        let result = service
            .register_participant(make_participant("b@example.com"), Some(event_id))
            .await;

        assert!(matches!(result, Err(ApiError::CapacityExceeded { .. })));
        assert_eq!(tickets_remaining(&service, event_id).await, 0);
        assert_eq!(service.participants.len().await, 1);
    }

    #[tokio::test]
    async fn leave_without_membership_fails_not_registered() {
        let service = make_service();
        let event_id = seed_event(&service, "a", 10).await;

        let registered = service
            .register_participant(make_participant("a@example.com"), None)
            .await;
        let Ok(registered) = registered else {
            panic!("registration failed");
        };

        let result = service.leave_event(registered.participant_id, event_id).await;
        assert!(matches!(result, Err(ApiError::NotRegistered { .. })));
    }

    #[tokio::test]
    async fn join_unknown_participant_fails() {
        let service = make_service();
        let event_id = seed_event(&service, "a", 10).await;

        let result = service.join_event(ParticipantId::new(), event_id).await;
        assert!(matches!(result, Err(ApiError::ParticipantNotFound(_))));
        assert_eq!(tickets_remaining(&service, event_id).await, 10);
    }

    #[tokio::test]
    async fn delete_event_cascade_deletes_exclusive_members_and_detaches_shared() {
        let service = make_service();
        let doomed = seed_event(&service, "doomed", 10).await;
        let other = seed_event(&service, "other", 10).await;

        // Exclusive member: only registered for the doomed event.
        let exclusive = service
            .register_participant(make_participant("only@example.com"), Some(doomed))
            .await;
        // Shared member: registered for both.
        let shared = service
            .register_participant(make_participant("both@example.com"), Some(doomed))
            .await;
        let (Ok(exclusive), Ok(shared)) = (exclusive, shared) else {
            panic!("registration failed");
        };
        let _ = service.join_event(shared.participant_id, other).await;

        let result = service.delete_event(doomed).await;
        assert!(result.is_ok());

        // Exclusive participant is gone entirely.
        let lookup = service.get_participant(exclusive.participant_id).await;
        assert!(matches!(lookup, Err(ApiError::ParticipantNotFound(_))));

        // Shared participant survives with one membership left.
        let lookup = service.get_participant(shared.participant_id).await;
        let Ok(survivor) = lookup else {
            panic!("shared participant vanished");
        };
        assert_eq!(survivor.events.len(), 1);
        assert!(survivor.events.contains(&other));
        assert_eq!(tickets_remaining(&service, other).await, 9);
    }

    #[tokio::test]
    async fn delete_participant_resyncs_affected_events() {
        let service = make_service();
        let first = seed_event(&service, "a", 10).await;
        let second = seed_event(&service, "b", 5).await;

        let registered = service
            .register_participant(make_participant("a@example.com"), Some(first))
            .await;
        let Ok(registered) = registered else {
            panic!("registration failed");
        };
        let _ = service.join_event(registered.participant_id, second).await;
        assert_eq!(tickets_remaining(&service, first).await, 9);
        assert_eq!(tickets_remaining(&service, second).await, 4);

        let result = service.delete_participant(registered.participant_id).await;
        assert!(result.is_ok());
        assert_eq!(tickets_remaining(&service, first).await, 10);
        assert_eq!(tickets_remaining(&service, second).await, 5);
    }

    #[tokio::test]
    async fn update_participant_rejects_taken_email() {
        let service = make_service();
        let _ = service
            .register_participant(make_participant("a@example.com"), None)
            .await;
        let second = service
            .register_participant(make_participant("b@example.com"), None)
            .await;
        let Ok(second) = second else {
            panic!("registration failed");
        };

        let result = service
            .update_participant(
                second.participant_id,
                ParticipantPatch {
                    email: Some("a@example.com".to_string()),
                    ..ParticipantPatch::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::EmailConflict(_))));
    }

    #[tokio::test]
    async fn event_participants_requires_existing_event() {
        let service = make_service();
        let result = service.event_participants(EventId::new()).await;
        assert!(matches!(result, Err(ApiError::EventNotFound(_))));
    }
}
