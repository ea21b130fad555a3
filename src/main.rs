// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use exam_trainer::config::Config;
use exam_trainer::routes;
use exam_trainer::services::{generator::LlmQuestionGenerator, session_store::SessionStore};
use exam_trainer::state::AppState;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load configuration from .env / environment; a missing credential stops startup here
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if config.uses_fallback_secret() {
        tracing::warn!("SESSION_SECRET not set, session cookies are signed with an insecure default");
    }

    let generator = match LlmQuestionGenerator::from_config(&config) {
        Ok(generator) => generator,
        Err(e) => {
            tracing::error!("Failed to build model client: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Using model {} for {} questions",
        config.openai_model,
        config.exam_name
    );

    let sessions = SessionStore::new(config.session_ttl_secs);
    sessions.spawn_cleanup(Duration::from_secs(600));

    // Create AppState
    let state = AppState {
        config: config.clone(),
        sessions,
        generator: Arc::new(generator),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
