//! Relay server setup
//!
//! Provides the HTTP router and the listener loop.

mod handler;
mod state;

pub use handler::upgrade_handler;
pub use state::RelayState;

use crate::connection::RelayChannels;
use axum::{
    routing::{any, get},
    Router,
};
use relay_common::{AppConfig, AppError};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the relay router with the upgrade endpoint mounted at `path`
pub fn create_router(path: &str) -> Router<RelayState> {
    Router::new()
        .route(path, any(upgrade_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(path: &str, state: RelayState) -> Router {
    create_router(path)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the application on an already-bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}

/// Run the relay server
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    tracing::info!("Starting relay server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::bind(addr, e))?;

    let local = listener.local_addr().map_err(AppError::internal)?;
    tracing::info!("Relay listening on ws://{}", local);

    serve(listener, app).await
}

/// Run the complete relay server with configuration
///
/// `channels` are the sending ends of the hub's queues.
pub async fn run(config: AppConfig, channels: RelayChannels) -> Result<(), AppError> {
    let state = RelayState::from_settings(&config.relay, channels);
    let app = create_app(&config.relay.path, state);

    run_server(app, &config.gateway.address()).await
}
