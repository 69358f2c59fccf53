//! Basic type definitions for the relay
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: UUID-based connection-scoped user identifier
//! - `RoomId`: short alphanumeric room identifier

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Connection-scoped user identifier (newtype pattern)
///
/// Wraps a UUID v4 assigned by the transport layer at connect time.
/// Implements Hash and Eq for use as HashMap keys; serializes as the
/// hyphenated UUID string on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room identifier (8-character alphanumeric)
///
/// Globally unique among currently-live rooms; the id space (62^8) is
/// large enough that collisions among live rooms are negligible, and
/// the registry re-rolls on the off chance one occurs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub String);

/// Length of generated room identifiers
const ROOM_ID_LEN: usize = 8;

impl RoomId {
    /// Generate a new random 8-character room id
    pub fn generate() -> Self {
        use rand::Rng;
        let id: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(ROOM_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
