//! RoomRegistry: the owner of all live rooms
//!
//! The sole place permitted to create or remove Room entries. All
//! access goes through the coordinator actor, so the registry itself
//! needs no interior locking; every fallible operation surfaces
//! `RegistryError::RoomNotFound` explicitly instead of logging and
//! returning sentinels.

use std::collections::HashMap;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::message::Message;
use crate::room::Room;
use crate::types::{ClientId, RoomId};
use crate::user::User;

/// Registry-level errors
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    /// Requested room id has no live Room
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),
}

/// Mapping from room id to Room, exclusive owner of all Room instances
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty room under a fresh unique id. Never fails; the
    /// loop re-rolls on the negligible chance of colliding with a live
    /// room.
    pub fn create(&mut self) -> RoomId {
        let room_id = loop {
            let id = RoomId::generate();
            if !self.rooms.contains_key(&id) {
                break id;
            }
        };
        self.rooms.insert(room_id.clone(), Room::new(room_id.clone()));
        room_id
    }

    pub fn has(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Insert a user into a room, canceling any pending deletion.
    /// Overwrites on repeated calls with the same user id.
    pub fn add_user(&mut self, user: User, room_id: &RoomId) -> Result<(), RegistryError> {
        let room = self.room_mut(room_id)?;
        room.add_user(user);
        Ok(())
    }

    /// Remove a user from a room, returning their record. The caller
    /// applies the empty-room lifetime policy afterwards.
    pub fn delete_user(
        &mut self,
        user_id: &ClientId,
        room_id: &RoomId,
    ) -> Result<Option<User>, RegistryError> {
        let room = self.room_mut(room_id)?;
        Ok(room.remove_user(user_id))
    }

    pub fn get_users(&self, room_id: &RoomId) -> Result<Vec<User>, RegistryError> {
        let room = self.room(room_id)?;
        Ok(room.users().cloned().collect())
    }

    pub fn add_message(&mut self, message: Message, room_id: &RoomId) -> Result<(), RegistryError> {
        let room = self.room_mut(room_id)?;
        room.push_message(message);
        Ok(())
    }

    pub fn get_all_messages(&self, room_id: &RoomId) -> Result<Vec<Message>, RegistryError> {
        let room = self.room(room_id)?;
        Ok(room.messages().to_vec())
    }

    /// Look up one member; None when the room or the user is absent
    pub fn get_user(&self, user_id: &ClientId, room_id: &RoomId) -> Option<User> {
        self.rooms
            .get(room_id)
            .and_then(|room| room.get_user(user_id))
            .cloned()
    }

    /// Other members of the room, keyed by id; empty when the room is
    /// absent (callers treat that as "no mates", never a hard error)
    pub fn get_mates(&self, user_id: &ClientId, room_id: &RoomId) -> HashMap<ClientId, User> {
        self.rooms
            .get(room_id)
            .map(|room| room.mates(user_id))
            .unwrap_or_default()
    }

    pub fn is_empty(&self, room_id: &RoomId) -> Result<bool, RegistryError> {
        Ok(self.room(room_id)?.is_empty())
    }

    /// Record a grace-period deletion timer for an (empty) room
    pub fn schedule_deletion(
        &mut self,
        room_id: &RoomId,
        epoch: u64,
        handle: JoinHandle<()>,
    ) -> Result<(), RegistryError> {
        let room = self.room_mut(room_id)?;
        room.set_pending_deletion(epoch, handle);
        Ok(())
    }

    /// Complete a scheduled deletion. Removes the room only if it is
    /// still empty and the pending epoch matches; a stale timer that
    /// raced a cancel is ignored. Returns whether the room was removed.
    pub fn expire(&mut self, room_id: &RoomId, epoch: u64) -> bool {
        let Some(room) = self.rooms.get(room_id) else {
            return false;
        };
        if !room.is_empty() || room.pending_epoch() != Some(epoch) {
            return false;
        }
        self.rooms.remove(room_id);
        true
    }

    fn room(&self, room_id: &RoomId) -> Result<&Room, RegistryError> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.clone()))
    }

    fn room_mut(&mut self, room_id: &RoomId) -> Result<&mut Room, RegistryError> {
        self.rooms
            .get_mut(room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.clone()))
    }
}
