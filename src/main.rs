//! evently server entry point.
//!
//! Starts the Axum HTTP server, hydrating the in-memory registries from
//! PostgreSQL snapshots when persistence is enabled.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use evently::api;
use evently::app_state::AppState;
use evently::config::ServerConfig;
use evently::domain::{EventRegistry, ParticipantRegistry};
use evently::persistence::PostgresPersistence;
use evently::service::{EventService, ExportService, RegistrationService, StatsService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting evently");

    // Build domain layer
    let events = Arc::new(EventRegistry::new());
    let participants = Arc::new(ParticipantRegistry::new());

    // Optional durable snapshot layer
    let persistence = if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        let persistence = PostgresPersistence::new(pool);
        persistence.ensure_schema().await?;

        for record in persistence.load_events().await? {
            events.insert(record).await?;
        }
        for record in persistence.load_participants().await? {
            participants.insert(record).await?;
        }
        tracing::info!(
            events = events.len().await,
            participants = participants.len().await,
            "state hydrated from postgres"
        );
        Some(persistence)
    } else {
        tracing::info!("persistence disabled; running from memory only");
        None
    };

    // Build service layer
    let event_service = Arc::new(EventService::new(Arc::clone(&events), persistence.clone()));
    let registration_service = Arc::new(RegistrationService::new(
        Arc::clone(&events),
        Arc::clone(&participants),
        persistence.clone(),
    ));
    let stats_service = Arc::new(StatsService::new(
        Arc::clone(&events),
        Arc::clone(&participants),
    ));
    let export_service = Arc::new(ExportService::new(
        config.export_dir.clone(),
        config.pdf_font_dir.clone(),
        config.pdf_font_family.clone(),
    ));

    // Build application state
    let app_state = AppState {
        event_service,
        registration_service,
        stats_service,
        export_service,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
