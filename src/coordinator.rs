//! SessionCoordinator actor implementation
//!
//! The central actor that owns all state: the connection table, the
//! room registry, and the message factory. Uses the Actor pattern with
//! mpsc channels for message passing, which serializes every registry
//! mutation and every decision that depends on room state (such as
//! "room is empty, schedule deletion"), so no read ever observes a
//! torn room and the empty-room check cannot race a concurrent join.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::message::{InfoAction, MessageFactory};
use crate::name::generate_display_name;
use crate::protocol::{ServerEvent, SignalPayload};
use crate::registry::RoomRegistry;
use crate::types::{ClientId, RoomId};
use crate::user::User;

/// How long an empty room is kept alive before deletion. Tolerates a
/// transient full-disconnect where everyone drops and promptly rejoins.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10 * 60);

/// Commands sent from connection handlers (and expiry timers) to the
/// coordinator actor
#[derive(Debug)]
pub enum Command {
    /// New connection established
    Connect {
        client_id: ClientId,
        sender: mpsc::Sender<ServerEvent>,
    },
    /// Connection closed (transport-initiated)
    Disconnect { client_id: ClientId },
    /// Create a fresh room
    CreateRoom { client_id: ClientId },
    /// Check whether a room exists
    CheckRoom { client_id: ClientId, room_id: RoomId },
    /// Join a room under a display name
    JoinRoom {
        client_id: ClientId,
        room_id: RoomId,
        name: String,
    },
    /// Leave the current room
    LeaveRoom { client_id: ClientId },
    /// Send a chat message to the current room
    SendMessage { client_id: ClientId, text: String },
    /// Relay a signaling payload to its target connection
    Signal {
        client_id: ClientId,
        payload: SignalPayload,
    },
    /// List the other members of a room
    GetMates {
        client_id: ClientId,
        user_id: ClientId,
        room_id: RoomId,
    },
    /// Grace-period timer fired for an empty room
    ExpireRoom { room_id: RoomId, epoch: u64 },
}

/// The session coordinator actor
///
/// Processes commands one at a time; per-room operations are therefore
/// linearizable in command-acceptance order, which is also the order
/// messages are appended to each room log and fanned out to members.
pub struct SessionCoordinator {
    /// All live connections: ClientId -> Connection
    connections: HashMap<ClientId, Connection>,
    /// All live rooms
    registry: RoomRegistry,
    /// Server-assigned ids and timestamps for chat messages
    factory: MessageFactory,
    /// Empty-room grace period before deletion
    grace_period: Duration,
    /// Monotonic schedule counter guarding against stale expiry timers
    deletion_epoch: u64,
    /// Own sender, handed to spawned expiry timers
    cmd_tx: mpsc::Sender<Command>,
    /// Command receiver channel
    receiver: mpsc::Receiver<Command>,
}

impl SessionCoordinator {
    /// Create a coordinator with the default grace period
    pub fn new(cmd_tx: mpsc::Sender<Command>, receiver: mpsc::Receiver<Command>) -> Self {
        Self::with_grace_period(cmd_tx, receiver, DEFAULT_GRACE_PERIOD)
    }

    /// Create a coordinator with a custom empty-room grace period
    pub fn with_grace_period(
        cmd_tx: mpsc::Sender<Command>,
        receiver: mpsc::Receiver<Command>,
        grace_period: Duration,
    ) -> Self {
        Self {
            connections: HashMap::new(),
            registry: RoomRegistry::new(),
            factory: MessageFactory::new(),
            grace_period,
            deletion_epoch: 0,
            cmd_tx,
            receiver,
        }
    }

    /// Run the coordinator event loop
    ///
    /// Continuously receives and processes commands until all senders
    /// are dropped.
    pub async fn run(mut self) {
        info!("SessionCoordinator started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd).await;
        }

        info!("SessionCoordinator shutting down");
    }

    /// Process a single command
    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect { client_id, sender } => {
                self.handle_connect(client_id, sender);
            }
            Command::Disconnect { client_id } => {
                self.handle_disconnect(client_id).await;
            }
            Command::CreateRoom { client_id } => {
                self.handle_create_room(client_id).await;
            }
            Command::CheckRoom { client_id, room_id } => {
                self.handle_check_room(client_id, room_id).await;
            }
            Command::JoinRoom {
                client_id,
                room_id,
                name,
            } => {
                self.handle_join_room(client_id, room_id, name).await;
            }
            Command::LeaveRoom { client_id } => {
                self.handle_leave_room(client_id).await;
            }
            Command::SendMessage { client_id, text } => {
                self.handle_send_message(client_id, text).await;
            }
            Command::Signal { client_id, payload } => {
                self.handle_signal(client_id, payload).await;
            }
            Command::GetMates {
                client_id,
                user_id,
                room_id,
            } => {
                self.handle_get_mates(client_id, user_id, room_id).await;
            }
            Command::ExpireRoom { room_id, epoch } => {
                self.handle_expire_room(room_id, epoch);
            }
        }
    }

    /// Handle new connection
    fn handle_connect(&mut self, client_id: ClientId, sender: mpsc::Sender<ServerEvent>) {
        info!("Connection {} established", client_id);
        self.connections
            .insert(client_id, Connection::new(client_id, sender));
        debug!(
            "Total connections: {}, total rooms: {}",
            self.connections.len(),
            self.registry.room_count()
        );
    }

    /// Handle connection loss: same as leave-room, performed
    /// automatically, then the connection entry is dropped
    async fn handle_disconnect(&mut self, client_id: ClientId) {
        info!("Connection {} closed", client_id);

        let room_id = self
            .connections
            .get_mut(&client_id)
            .and_then(|conn| conn.room_id.take());
        if let Some(room_id) = room_id {
            self.remove_from_room(client_id, room_id).await;
        }

        self.connections.remove(&client_id);
        debug!(
            "Total connections: {}, total rooms: {}",
            self.connections.len(),
            self.registry.room_count()
        );
    }

    /// Handle room creation; acked with the new room id
    ///
    /// A fresh room starts empty, so it immediately enters the grace
    /// period: if nobody joins before it elapses, the room is removed
    /// (the first join cancels the timer). Keeps the invariant that an
    /// empty room always has a pending deletion.
    async fn handle_create_room(&mut self, client_id: ClientId) {
        let room_id = self.registry.create();
        info!("Connection {} created room {}", client_id, room_id);
        self.schedule_deletion(room_id.clone());
        self.send_to(client_id, ServerEvent::RoomCreated { room_id })
            .await;
    }

    /// Handle room existence check; acked with a boolean
    async fn handle_check_room(&mut self, client_id: ClientId, room_id: RoomId) {
        let exists = self.registry.has(&room_id);
        self.send_to(client_id, ServerEvent::RoomChecked { room_id, exists })
            .await;
    }

    /// Handle room joining
    ///
    /// Strict contract: joining an unknown room is rejected with a null
    /// user in the ack, and a rejected join leaves any current
    /// membership untouched. A connection already in a different room
    /// leaves it first (with full leave side effects) before joining.
    async fn handle_join_room(&mut self, client_id: ClientId, room_id: RoomId, name: String) {
        if !self.connections.contains_key(&client_id) {
            return;
        }

        // Validate the target before touching existing membership so a
        // mistyped room id cannot evict the client from their room
        if !self.registry.has(&room_id) {
            warn!(
                "Connection {} tried to join unknown room {}",
                client_id, room_id
            );
            self.send_to(client_id, ServerEvent::RoomJoined { user: None })
                .await;
            return;
        }

        let previous = self
            .connections
            .get(&client_id)
            .and_then(|conn| conn.room_id.clone());
        if let Some(previous) = previous {
            if previous != room_id {
                if let Some(conn) = self.connections.get_mut(&client_id) {
                    conn.room_id = None;
                }
                self.remove_from_room(client_id, previous).await;
            }
        }

        let name = name.trim().to_string();
        let name = if name.is_empty() {
            generate_display_name()
        } else {
            name
        };

        // A rejoin of the same room just overwrites the membership
        // entry; peers already saw one join, so no fan-out for it
        let already_member = self.registry.get_user(&client_id, &room_id).is_some();

        let user = User::new(client_id, name, room_id.clone());
        if let Err(err) = self.registry.add_user(user.clone(), &room_id) {
            warn!("Join failed: {}", err);
            self.send_to(client_id, ServerEvent::RoomJoined { user: None })
                .await;
            return;
        }
        if let Some(conn) = self.connections.get_mut(&client_id) {
            conn.room_id = Some(room_id.clone());
        }

        info!(
            "User '{}' ({}) joined room {}",
            user.name, client_id, room_id
        );

        // The join event is part of the log, so the joiner sees it in
        // the history while the others get it broadcast
        let info = if already_member {
            None
        } else {
            let info = self.factory.info_message(InfoAction::Joined, user.clone());
            if let Err(err) = self.registry.add_message(info.clone(), &room_id) {
                warn!("Failed to log join event: {}", err);
            }
            Some(info)
        };
        let history = self.registry.get_all_messages(&room_id).unwrap_or_default();

        self.send_to(
            client_id,
            ServerEvent::RoomJoined {
                user: Some(user.clone()),
            },
        )
        .await;
        self.send_to(client_id, ServerEvent::MessageAll { messages: history })
            .await;

        let Some(info) = info else {
            return;
        };
        let mates: Vec<ClientId> = self
            .registry
            .get_mates(&client_id, &room_id)
            .into_keys()
            .collect();
        for mate_id in mates {
            self.send_to(
                mate_id,
                ServerEvent::MessageNew {
                    message: info.clone(),
                },
            )
            .await;
            self.send_to(mate_id, ServerEvent::UserJoined { user: user.clone() })
                .await;
        }
    }

    /// Handle voluntary room leaving
    async fn handle_leave_room(&mut self, client_id: ClientId) {
        let Some(conn) = self.connections.get_mut(&client_id) else {
            return;
        };
        let Some(room_id) = conn.room_id.take() else {
            debug!("Connection {} left while not in a room", client_id);
            return;
        };

        info!("Connection {} left room {}", client_id, room_id);
        self.remove_from_room(client_id, room_id).await;
    }

    /// Handle a chat message: append to the log, then broadcast to all
    /// current members including the sender
    async fn handle_send_message(&mut self, client_id: ClientId, text: String) {
        let Some(room_id) = self
            .connections
            .get(&client_id)
            .and_then(|conn| conn.room_id.clone())
        else {
            debug!("Connection {} sent a message outside any room", client_id);
            return;
        };

        let Some(user) = self.registry.get_user(&client_id, &room_id) else {
            debug!("Connection {} has no member record in {}", client_id, room_id);
            return;
        };

        let message = self.factory.user_message(text, &user);
        if let Err(err) = self.registry.add_message(message.clone(), &room_id) {
            warn!("Failed to append message: {}", err);
            return;
        }

        let members = self.registry.get_users(&room_id).unwrap_or_default();
        for member in members {
            self.send_to(
                member.id,
                ServerEvent::MessageNew {
                    message: message.clone(),
                },
            )
            .await;
        }
    }

    /// Handle a signaling payload: forward verbatim to the target
    /// connection only; unknown target is silently dropped (this event
    /// class has no ack, so best-effort is the contract)
    async fn handle_signal(&mut self, client_id: ClientId, payload: SignalPayload) {
        if !self.connections.contains_key(&payload.to_id) {
            debug!(
                "Dropping signal from {} to unknown target {}",
                client_id, payload.to_id
            );
            return;
        }
        self.send_to(
            payload.to_id,
            ServerEvent::SignalNew {
                from_id: payload.from_id,
                to_id: payload.to_id,
                data: payload.data,
            },
        )
        .await;
    }

    /// Handle a mates query; acked with the other members of the room
    /// (empty when the room is absent)
    async fn handle_get_mates(&mut self, client_id: ClientId, user_id: ClientId, room_id: RoomId) {
        let mates = self.registry.get_mates(&user_id, &room_id);
        self.send_to(client_id, ServerEvent::Mates { mates }).await;
    }

    /// Handle a fired grace-period timer. The registry re-checks both
    /// emptiness and the schedule epoch, so a timer that raced a cancel
    /// is a no-op.
    fn handle_expire_room(&mut self, room_id: RoomId, epoch: u64) {
        if self.registry.expire(&room_id, epoch) {
            info!("Room {} deleted after grace period", room_id);
        } else {
            debug!("Stale expiry for room {} ignored", room_id);
        }
    }

    /// Remove a user from a room, log and broadcast the departure, and
    /// apply the debounced empty-room policy
    async fn remove_from_room(&mut self, client_id: ClientId, room_id: RoomId) {
        let removed = match self.registry.delete_user(&client_id, &room_id) {
            Ok(removed) => removed,
            Err(err) => {
                // Room already gone; treat as no-op
                debug!("Leave ignored: {}", err);
                return;
            }
        };

        if let Some(user) = removed {
            let info = self.factory.info_message(InfoAction::Left, user.clone());
            if let Err(err) = self.registry.add_message(info.clone(), &room_id) {
                warn!("Failed to log leave event: {}", err);
            }

            let remaining = self.registry.get_users(&room_id).unwrap_or_default();
            for member in remaining {
                self.send_to(
                    member.id,
                    ServerEvent::MessageNew {
                        message: info.clone(),
                    },
                )
                .await;
                self.send_to(member.id, ServerEvent::UserLeft { user: user.clone() })
                    .await;
            }
        }

        if let Ok(true) = self.registry.is_empty(&room_id) {
            self.schedule_deletion(room_id);
        }
    }

    /// Start the grace-period timer for a now-empty room
    fn schedule_deletion(&mut self, room_id: RoomId) {
        self.deletion_epoch += 1;
        let epoch = self.deletion_epoch;
        let cmd_tx = self.cmd_tx.clone();
        let grace = self.grace_period;
        let timer_room = room_id.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = cmd_tx
                .send(Command::ExpireRoom {
                    room_id: timer_room,
                    epoch,
                })
                .await;
        });

        if let Err(err) = self.registry.schedule_deletion(&room_id, epoch, handle) {
            warn!("Failed to schedule deletion: {}", err);
        } else {
            debug!("Room {} empty, deletion scheduled (epoch {})", room_id, epoch);
        }
    }

    /// Send an event to one connection, dropping it if the connection
    /// is gone or its channel is closed
    async fn send_to(&self, client_id: ClientId, event: ServerEvent) {
        if let Some(conn) = self.connections.get(&client_id) {
            if conn.send(event).await.is_err() {
                debug!("Connection {} channel closed, event dropped", client_id);
            }
        }
    }
}
