//! Database models for record snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event snapshot row from the `events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSnapshotRow {
    /// Event id, primary key.
    pub id: Uuid,
    /// Full event record as JSONB.
    pub payload: serde_json::Value,
    /// Server-side write timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A participant snapshot row from the `participants` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSnapshotRow {
    /// Participant id, primary key.
    pub id: Uuid,
    /// Full participant record (including memberships) as JSONB.
    pub payload: serde_json::Value,
    /// Server-side write timestamp.
    pub updated_at: DateTime<Utc>,
}
