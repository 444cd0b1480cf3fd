//! PostgreSQL implementation of the persistence layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{EventSnapshotRow, ParticipantSnapshotRow};
use crate::domain::{EventId, EventRecord, ParticipantId, ParticipantRecord};
use crate::error::ApiError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the snapshot tables if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns a [`ApiError::PersistenceError`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS events ( \
             id UUID PRIMARY KEY, \
             payload JSONB NOT NULL, \
             updated_at TIMESTAMPTZ NOT NULL DEFAULT now())",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ApiError::PersistenceError(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS participants ( \
             id UUID PRIMARY KEY, \
             payload JSONB NOT NULL, \
             updated_at TIMESTAMPTZ NOT NULL DEFAULT now())",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ApiError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    /// Writes (or overwrites) the snapshot for an event.
    ///
    /// # Errors
    ///
    /// Returns a [`ApiError::PersistenceError`] on serialization or
    /// database failure.
    pub async fn upsert_event(&self, record: &EventRecord) -> Result<(), ApiError> {
        let payload = serde_json::to_value(record)
            .map_err(|e| ApiError::PersistenceError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO events (id, payload, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (id) DO UPDATE SET payload = $2, updated_at = now()",
        )
        .bind(*record.event_id.as_uuid())
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| ApiError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    /// Deletes the snapshot for an event.
    ///
    /// # Errors
    ///
    /// Returns a [`ApiError::PersistenceError`] on database failure.
    pub async fn delete_event(&self, event_id: EventId) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(*event_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| ApiError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    /// Writes (or overwrites) the snapshot for a participant.
    ///
    /// # Errors
    ///
    /// Returns a [`ApiError::PersistenceError`] on serialization or
    /// database failure.
    pub async fn upsert_participant(&self, record: &ParticipantRecord) -> Result<(), ApiError> {
        let payload = serde_json::to_value(record)
            .map_err(|e| ApiError::PersistenceError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO participants (id, payload, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (id) DO UPDATE SET payload = $2, updated_at = now()",
        )
        .bind(*record.participant_id.as_uuid())
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| ApiError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    /// Deletes the snapshot for a participant.
    ///
    /// # Errors
    ///
    /// Returns a [`ApiError::PersistenceError`] on database failure.
    pub async fn delete_participant(&self, participant_id: ParticipantId) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(*participant_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| ApiError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    /// Loads all event snapshots, newest write last.
    ///
    /// # Errors
    ///
    /// Returns a [`ApiError::PersistenceError`] on database failure or
    /// if a stored payload no longer deserializes.
    pub async fn load_events(&self) -> Result<Vec<EventRecord>, ApiError> {
        let rows = sqlx::query_as::<_, (Uuid, serde_json::Value, DateTime<Utc>)>(
            "SELECT id, payload, updated_at FROM events ORDER BY updated_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ApiError::PersistenceError(e.to_string()))?;

        rows.into_iter()
            .map(|(id, payload, updated_at)| {
                let row = EventSnapshotRow {
                    id,
                    payload,
                    updated_at,
                };
                serde_json::from_value(row.payload)
                    .map_err(|e| ApiError::PersistenceError(format!("event {id}: {e}")))
            })
            .collect()
    }

    /// Loads all participant snapshots, newest write last.
    ///
    /// # Errors
    ///
    /// Returns a [`ApiError::PersistenceError`] on database failure or
    /// if a stored payload no longer deserializes.
    pub async fn load_participants(&self) -> Result<Vec<ParticipantRecord>, ApiError> {
        let rows = sqlx::query_as::<_, (Uuid, serde_json::Value, DateTime<Utc>)>(
            "SELECT id, payload, updated_at FROM participants ORDER BY updated_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ApiError::PersistenceError(e.to_string()))?;

        rows.into_iter()
            .map(|(id, payload, updated_at)| {
                let row = ParticipantSnapshotRow {
                    id,
                    payload,
                    updated_at,
                };
                serde_json::from_value(row.payload)
                    .map_err(|e| ApiError::PersistenceError(format!("participant {id}: {e}")))
            })
            .collect()
    }
}
