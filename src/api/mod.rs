//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; system endpoints
//! live at the root. With the `swagger-ui` feature enabled the OpenAPI
//! document is served at `/docs`.

pub mod dto;
pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// OpenAPI document covering every endpoint.
#[cfg(feature = "swagger-ui")]
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        handlers::event::create_event,
        handlers::event::list_events,
        handlers::event::search_event,
        handlers::event::get_event,
        handlers::event::update_event,
        handlers::event::delete_event,
        handlers::event::event_participants,
        handlers::event::events_by_owner,
        handlers::participant::register_participant,
        handlers::participant::list_participants,
        handlers::participant::search_participants,
        handlers::participant::get_participant,
        handlers::participant::update_participant,
        handlers::participant::delete_participant,
        handlers::participant::join_event,
        handlers::participant::leave_event,
        handlers::export::export_participants,
        handlers::stats::stats_overview,
        handlers::system::health_handler,
        handlers::system::export_formats_handler,
    ),
    tags(
        (name = "Events", description = "Event CRUD and lookups"),
        (name = "Participants", description = "Registration, membership, and search"),
        (name = "Exports", description = "Attendee list downloads"),
        (name = "Statistics", description = "Cross-event rollups"),
        (name = "System", description = "Health and catalogs"),
    )
)]
struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
    };

    router
}
