//! REST endpoint handlers organized by resource.

pub mod event;
pub mod export;
pub mod participant;
pub mod stats;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(event::routes())
        .merge(participant::routes())
        .merge(export::routes())
        .merge(stats::routes())
}
