//! Room Presence and Signaling Relay - Entry Point
//!
//! Reads configuration from the environment (fail fast when missing),
//! starts the SessionCoordinator actor, and accepts connections.

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use room_relay::{handle_connection, Config, SessionCoordinator};

/// Channel buffer size for coordinator commands
const CHANNEL_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=room_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("room_relay=info")),
        )
        .init();

    // Fatal before binding: both PORT and ALLOWED_ORIGIN are required
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    // Start TCP listener
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        "Relay listening on port {} (allowed origin: {})",
        config.port, config.allowed_origin
    );

    // Create the coordinator actor channel and start it; the actor
    // keeps its own sender so expiry timers can report back
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let coordinator = SessionCoordinator::new(cmd_tx.clone(), cmd_rx);
    tokio::spawn(coordinator.run());

    info!("SessionCoordinator actor started");

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let cmd_tx = cmd_tx.clone();
                let allowed_origin = config.allowed_origin.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx, allowed_origin).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
