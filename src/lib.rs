//! # evently
//!
//! REST API for event and participant management with synchronous
//! ticket-inventory accounting.
//!
//! Events carry a fixed ticket capacity and a stored remaining-ticket
//! counter; participants are deduplicated by email and hold a set of
//! event memberships. The registration service keeps the two facts
//! consistent on every mutation path, under a per-event lock.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── EventService / RegistrationService (service/)
//!     ├── StatsService / ExportService
//!     │
//!     ├── EventRegistry / ParticipantRegistry (domain/)
//!     │
//!     └── PostgreSQL Snapshots (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
