//! Room Presence and Signaling Relay Library
//!
//! A WebSocket relay for short-lived rooms: clients create or join a
//! room, exchange text messages, and bootstrap peer-to-peer media
//! sessions by relaying opaque signaling payloads between members. The
//! relay never touches media; it only manages membership, message
//! history, and fan-out.
//!
//! # Features
//! - Room creation with short unique ids
//! - Join/leave with membership broadcasts and full-history replay
//! - Room-wide chat with server-assigned message ids and timestamps
//! - Verbatim signaling relay between connected peers
//! - Debounced deletion of empty rooms (grace period for transient
//!   full-disconnects)
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `SessionCoordinator` is the central actor owning the room
//!   registry and the connection table
//! - Each connection has a `handler` task communicating with the
//!   coordinator
//! - No locks needed - all state access goes through message passing,
//!   so per-room operations are linearizable in acceptance order
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use room_relay::{handle_connection, Config, SessionCoordinator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().unwrap();
//!     let listener = TcpListener::bind(("0.0.0.0", config.port)).await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(SessionCoordinator::new(cmd_tx.clone(), cmd_rx).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         let origin = config.allowed_origin.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx, origin));
//!     }
//! }
//! ```

pub mod config;
pub mod connection;
pub mod coordinator;
pub mod error;
pub mod handler;
pub mod message;
pub mod name;
pub mod protocol;
pub mod registry;
pub mod room;
pub mod types;
pub mod user;

// Re-export main types for convenience
pub use config::{Config, ConfigError};
pub use connection::Connection;
pub use coordinator::{Command, SessionCoordinator, DEFAULT_GRACE_PERIOD};
pub use error::{AppError, SendError};
pub use handler::handle_connection;
pub use message::{InfoAction, Message, MessageFactory};
pub use protocol::{ClientEvent, ServerEvent, SignalPayload};
pub use registry::{RegistryError, RoomRegistry};
pub use room::Room;
pub use types::{ClientId, RoomId};
pub use user::User;
