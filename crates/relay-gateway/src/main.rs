//! Relay Gateway Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p relay-gateway
//! ```
//!
//! Configuration is loaded from environment variables. The binary has no
//! application hub of its own; it drains the hub queues and logs them.

use relay_common::{try_init_tracing, AppConfig, AppResult};
use relay_gateway::{hub_channels, HubInbox};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // Run the server
    if let Err(e) = run().await {
        error!(error = %e, "Relay failed to start");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    info!("Starting Relay Gateway Server...");

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        port = config.gateway.port,
        path = %config.relay.path,
        "Configuration loaded"
    );

    let (channels, inbox) = hub_channels(config.relay.inbound_capacity);
    tokio::spawn(drain_hub(inbox));

    relay_gateway::server::run(config, channels).await?;

    Ok(())
}

/// Consume the hub queues so pumps never block on them
async fn drain_hub(mut inbox: HubInbox) {
    loop {
        tokio::select! {
            Some(connection) = inbox.registrations.recv() => {
                debug!(connection_id = %connection.id(), "Connection registered");
            }
            Some(event) = inbox.inbound.recv() => {
                debug!(
                    connection_id = %event.connection.id(),
                    bytes = event.payload.len(),
                    "Inbound message"
                );
            }
            Some(connection) = inbox.closed.recv() => {
                info!(
                    connection_id = %connection.id(),
                    age_secs = connection.age().as_secs_f64(),
                    "Connection closed"
                );
                connection.close();
            }
            else => break,
        }
    }
}
