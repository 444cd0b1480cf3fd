//! Persistence layer: durable PostgreSQL snapshots of both collections.
//!
//! The in-memory registries are the live system of record; this layer
//! writes a JSONB snapshot of each record after mutations and loads them
//! back at startup. The concrete implementation uses `sqlx::PgPool` for
//! async PostgreSQL access.

pub mod models;
pub mod postgres;

pub use postgres::PostgresPersistence;
