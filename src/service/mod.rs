//! Service layer: business logic orchestration.
//!
//! [`EventService`] validates and persists event CRUD,
//! [`RegistrationService`] keeps the membership relation and ticket
//! counters consistent, [`StatsService`] aggregates cross-event rollups,
//! and [`ExportService`] renders attendee lists to files.

pub mod event_service;
pub mod export_service;
pub mod registration_service;
pub mod stats_service;

pub use event_service::EventService;
pub use export_service::{ExportFormat, ExportService};
pub use registration_service::RegistrationService;
pub use stats_service::StatsService;
