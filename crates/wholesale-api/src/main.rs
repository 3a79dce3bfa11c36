//! Wholesale API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wholesale_api::config::ApiConfig;
use wholesale_api::error::AppError;
use wholesale_api::routes;
use wholesale_api::state::AppState;
use wholesale_core::clock::SystemClock;
use wholesale_core::repository::EventRepository;
use wholesale_event_store::{InMemoryEventRepository, MIGRATOR, PgEventRepository};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("Starting wholesale API server");

    let config = ApiConfig::from_env()?;

    let event_repository: Arc<dyn EventRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;
            MIGRATOR.run(&pool).await?;
            Arc::new(PgEventRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, events are kept in memory only");
            Arc::new(InMemoryEventRepository::new())
        }
    };

    let app_state = AppState::new(Arc::new(SystemClock), event_repository, config.pricing);

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
