//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{EventService, ExportService, RegistrationService, StatsService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event CRUD and validation.
    pub event_service: Arc<EventService>,
    /// Membership orchestration and ticket accounting.
    pub registration_service: Arc<RegistrationService>,
    /// Cross-event statistics.
    pub stats_service: Arc<StatsService>,
    /// Attendee list exports.
    pub export_service: Arc<ExportService>,
}
