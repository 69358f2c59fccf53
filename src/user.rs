//! User struct definition
//!
//! Represents a room member for the lifetime of one connection.

use serde::{Deserialize, Serialize};

use crate::types::{ClientId, RoomId};

/// A room member
///
/// Created when a connection joins a room and destroyed on leave or
/// disconnect. The id is the connection-scoped id issued by the
/// transport layer, so signaling can address the user directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Connection-scoped identifier, assigned at connect time
    pub id: ClientId,
    /// Display name (client-supplied or server-generated)
    pub name: String,
    /// Room the user currently belongs to
    pub room_id: RoomId,
}

impl User {
    /// Create a new user bound to a room
    pub fn new(id: ClientId, name: String, room_id: RoomId) -> Self {
        Self { id, name, room_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialize_shape() {
        let user = User::new(ClientId::new(), "Alice".to_string(), RoomId::generate());
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"name\":\"Alice\""));
        // Wire names are camelCase, matching the client-side contract
        assert!(json.contains("\"roomId\""));
        assert!(!json.contains("\"room_id\""));
    }
}
