//! Room struct definition
//!
//! A room owns its member set, its append-only message log, and the
//! pending-deletion handle used by the debounced cleanup policy.

use std::collections::HashMap;

use tokio::task::JoinHandle;

use crate::message::Message;
use crate::types::{ClientId, RoomId};
use crate::user::User;

/// A scheduled empty-room deletion
///
/// The epoch distinguishes the live schedule from a stale timer that
/// fired after being canceled.
#[derive(Debug)]
pub struct PendingDeletion {
    pub epoch: u64,
    pub handle: JoinHandle<()>,
}

/// A chat/signaling room
///
/// Invariant: `pending_deletion` is `Some` only while `users` is empty.
#[derive(Debug)]
pub struct Room {
    /// Room identifier
    pub id: RoomId,
    /// Current members, keyed by connection id
    users: HashMap<ClientId, User>,
    /// Append-only log; insertion order is delivery order
    messages: Vec<Message>,
    /// Deletion timer, present only while the room is empty
    pending_deletion: Option<PendingDeletion>,
}

impl Room {
    /// Create a new empty room
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            users: HashMap::new(),
            messages: Vec::new(),
            pending_deletion: None,
        }
    }

    /// Insert a member, overwriting any previous entry for the same id.
    /// Cancels a pending deletion, restoring the room invariant.
    pub fn add_user(&mut self, user: User) {
        self.cancel_deletion();
        self.users.insert(user.id, user);
    }

    /// Remove a member, returning their record if present
    pub fn remove_user(&mut self, user_id: &ClientId) -> Option<User> {
        self.users.remove(user_id)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Current members in arbitrary order
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Look up one member by id
    pub fn get_user(&self, user_id: &ClientId) -> Option<&User> {
        self.users.get(user_id)
    }

    /// Other members, keyed by id
    pub fn mates(&self, user_id: &ClientId) -> HashMap<ClientId, User> {
        self.users
            .iter()
            .filter(|(id, _)| *id != user_id)
            .map(|(id, user)| (*id, user.clone()))
            .collect()
    }

    /// Append to the message log
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Full log in append order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Record a scheduled deletion for this (empty) room
    pub fn set_pending_deletion(&mut self, epoch: u64, handle: JoinHandle<()>) {
        self.cancel_deletion();
        self.pending_deletion = Some(PendingDeletion { epoch, handle });
    }

    /// Abort and clear any pending deletion timer
    pub fn cancel_deletion(&mut self) {
        if let Some(pending) = self.pending_deletion.take() {
            pending.handle.abort();
        }
    }

    /// Epoch of the live pending deletion, if any
    pub fn pending_epoch(&self) -> Option<u64> {
        self.pending_deletion.as_ref().map(|p| p.epoch)
    }
}
