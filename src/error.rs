//! Error types for the relay
//!
//! Defines transport-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions. Registry-level
//! failures live in `registry::RegistryError`; configuration failures
//! in `config::ConfigError`.

use thiserror::Error;

/// Transport-level errors
///
/// These end the affected connection but never the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal for the connection)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal for the connection)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (internal channel broken)
    #[error("Channel send error")]
    ChannelSend,
}

/// Message send errors
///
/// Occurs when attempting to send events through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
