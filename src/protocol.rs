//! Wire protocol definitions
//!
//! JSON-based bidirectional event protocol using Serde's tagged enum
//! for type-safe serialization/deserialization. Event names are stable
//! string constants in three namespaces: `room:*` (lifecycle), `msg:*`
//! (chat), `signal:*` (peer signaling). Request/acknowledge pairs are
//! modeled as a client event answered by a reply event on the same
//! connection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::types::{ClientId, RoomId};
use crate::user::User;

/// Opaque peer-signaling payload, forwarded verbatim
///
/// `data` carries the media-negotiation body (offer/answer/ICE); the
/// relay never inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalPayload {
    pub from_id: ClientId,
    pub to_id: ClientId,
    pub data: serde_json::Value,
}

/// Client → Server event
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Request a fresh room; acked with `room:created`
    #[serde(rename = "room:create")]
    CreateRoom,
    /// Ask whether a room exists; acked with `room:checked`
    #[serde(rename = "room:check")]
    CheckRoom { room_id: RoomId },
    /// Join a room; acked with `room:joined` (null user if room missing)
    #[serde(rename = "room:join")]
    JoinRoom { room_id: RoomId, name: String },
    /// Leave the current room (fire-and-forget)
    #[serde(rename = "room:leave")]
    LeaveRoom,
    /// Ask for the other members of a room; acked with `room:mates`
    #[serde(rename = "room:getmates")]
    GetMates { user_id: ClientId, room_id: RoomId },
    /// Send a chat message to the current room (fire-and-forget)
    #[serde(rename = "msg:sent")]
    MessageSent { text: String },
    /// Relay a signaling payload to one connected user (fire-and-forget)
    #[serde(rename = "signal:sent")]
    SignalSent {
        from_id: ClientId,
        to_id: ClientId,
        data: serde_json::Value,
    },
}

/// Server → Client event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Connection established, connection-scoped id issued
    #[serde(rename = "connected")]
    Connected { client_id: ClientId },
    /// Ack for `room:create`
    #[serde(rename = "room:created")]
    RoomCreated { room_id: RoomId },
    /// Ack for `room:check`
    #[serde(rename = "room:checked")]
    RoomChecked { room_id: RoomId, exists: bool },
    /// Ack for `room:join`; `user` is null when the room does not exist
    #[serde(rename = "room:joined")]
    RoomJoined { user: Option<User> },
    /// Ack for `room:getmates`
    #[serde(rename = "room:mates")]
    Mates { mates: HashMap<ClientId, User> },
    /// Another user joined the recipient's room
    #[serde(rename = "room:userjoined")]
    UserJoined { user: User },
    /// Another user left the recipient's room
    #[serde(rename = "room:userleaved")]
    UserLeft { user: User },
    /// A new message was appended to the recipient's room log
    #[serde(rename = "msg:new")]
    MessageNew { message: Message },
    /// Full room history, sent once on join
    #[serde(rename = "msg:all")]
    MessageAll { messages: Vec<Message> },
    /// A signaling payload addressed to the recipient
    #[serde(rename = "signal:new")]
    SignalNew {
        from_id: ClientId,
        to_id: ClientId,
        data: serde_json::Value,
    },
}
