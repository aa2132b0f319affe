// File: services/echoboard_backend/src/main.rs
use echoboard_backend::{app_state::AppState, routes};
use echoboard_config::load_config;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("{}", echoboard_common::config_error(e));
            return ExitCode::FAILURE;
        }
    };
    // Keeps the file appender flushing until shutdown.
    let _log_guard = echoboard_common::init_from_config(&config.logging);

    let state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Push notifications {}",
        if state.dispatcher.push_enabled() { "enabled" } else { "disabled" }
    );

    let app = routes::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Starting server at http://{}", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
