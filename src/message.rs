//! Chat message definitions and the message factory
//!
//! Two message kinds share one room log: user-authored text and
//! server-generated membership events. Both carry a server-assigned id
//! and a unix-seconds timestamp.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::types::ClientId;
use crate::user::User;

/// Message ids wrap at this bound; acceptable since nothing is persisted
const MESSAGE_ID_BOUND: u64 = 1_000_000;

/// Author of a user message (subset of User carried inside the log)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: ClientId,
    pub name: String,
}

/// Membership event kind for info messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoAction {
    Joined,
    Left,
}

/// A message in a room's log
///
/// Tagged union so both kinds travel in one stream; consumers match
/// exhaustively. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Client-authored text message
    User {
        id: String,
        timestamp: u64,
        text: String,
        author: Author,
    },
    /// Server-generated membership event
    Info {
        id: String,
        timestamp: u64,
        action: InfoAction,
        user: User,
    },
}

impl Message {
    /// Server-assigned id, unique within the factory's wrap bound
    pub fn id(&self) -> &str {
        match self {
            Message::User { id, .. } => id,
            Message::Info { id, .. } => id,
        }
    }

    /// Unix-seconds creation time
    pub fn timestamp(&self) -> u64 {
        match self {
            Message::User { timestamp, .. } => *timestamp,
            Message::Info { timestamp, .. } => *timestamp,
        }
    }
}

/// Builds messages with server-assigned ids and timestamps
///
/// Holds the monotonically-increasing id counter. Owned by the
/// coordinator, so no synchronization is needed.
#[derive(Debug, Default)]
pub struct MessageFactory {
    next_id: u64,
}

impl MessageFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> String {
        let id = self.next_id;
        self.next_id = (self.next_id + 1) % MESSAGE_ID_BOUND;
        id.to_string()
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    /// Build a user text message authored by the given user
    pub fn user_message(&mut self, text: String, user: &User) -> Message {
        Message::User {
            id: self.next_id(),
            timestamp: Self::now(),
            text,
            author: Author {
                id: user.id,
                name: user.name.clone(),
            },
        }
    }

    /// Build a membership info message for the given user
    pub fn info_message(&mut self, action: InfoAction, user: User) -> Message {
        Message::Info {
            id: self.next_id(),
            timestamp: Self::now(),
            action,
            user,
        }
    }
}
