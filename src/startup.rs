use crate::config::Config;
use crate::error::Error;
use crate::handlers::{
    generate_reminder_handler, health_handler, method_not_allowed_handler, not_found_handler,
};
use crate::openai::{CompletionClient, OpenAiClient};
use crate::reminder::ReminderGenerator;
use crate::shutdown;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the shared state around a model client
pub fn build_state(client: Arc<dyn CompletionClient>, config: &Config) -> AppState {
    AppState {
        generator: Arc::new(ReminderGenerator::from_config(client, config)),
    }
}

/// Build the router with all routes and middleware
pub fn build_router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/generate-reminder", post(generate_reminder_handler))
        .fallback(not_found_handler)
        .method_not_allowed_fallback(method_not_allowed_handler)
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Construct the model client once and serve until a shutdown signal
pub async fn start_server(config: Config) -> miette::Result<()> {
    let client: Arc<dyn CompletionClient> = Arc::new(OpenAiClient::from_config(&config)?);
    let state = build_state(client, &config);
    let app = build_router(state, config.body_limit_bytes());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.map_err(Error::from)?;
    info!(
        "Server is running at http://{}",
        listener.local_addr().map_err(Error::from)?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .map_err(Error::from)?;

    info!("Server stopped");
    Ok(())
}
