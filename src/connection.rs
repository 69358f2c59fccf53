//! Connection struct definition
//!
//! Represents one live transport connection: its id, its outbound
//! event channel, and the room it currently occupies.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::protocol::ServerEvent;
use crate::types::{ClientId, RoomId};

/// A connected client
///
/// Tracks the per-connection state the coordinator needs: the
/// connection-scoped id, the outbound channel drained by the write
/// task, and which room (if any) the connection has joined.
#[derive(Debug)]
pub struct Connection {
    /// Connection-scoped identifier, assigned at connect time
    pub id: ClientId,
    /// Server → client event channel
    pub sender: mpsc::Sender<ServerEvent>,
    /// Room currently joined, if any
    pub room_id: Option<RoomId>,
}

impl Connection {
    /// Create a new connection record with the given id and sender
    pub fn new(id: ClientId, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id,
            sender,
            room_id: None,
        }
    }

    /// Send an event to this connection
    ///
    /// Returns an error if the channel is closed (client disconnected);
    /// callers treat that as best-effort delivery and move on.
    pub async fn send(&self, event: ServerEvent) -> Result<(), SendError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connection_starts_outside_any_room() {
        let (tx, _rx) = mpsc::channel(32);
        let conn = Connection::new(ClientId::new(), tx);
        assert!(conn.room_id.is_none());
    }

    #[tokio::test]
    async fn test_send_to_closed_channel_fails() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let conn = Connection::new(ClientId::new(), tx);
        let result = conn
            .send(ServerEvent::Connected { client_id: conn.id })
            .await;
        assert!(result.is_err());
    }
}
