//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake with
//! Origin validation, event parsing, and bidirectional communication
//! with the SessionCoordinator.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::coordinator::Command;
use crate::error::AppError;
use crate::protocol::{ClientEvent, ServerEvent, SignalPayload};
use crate::types::ClientId;

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake (rejecting browser requests from
/// origins other than `allowed_origin`), sets up bidirectional
/// communication, and manages the connection lifecycle.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<Command>,
    allowed_origin: String,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake with Origin check. Requests without an
    // Origin header (non-browser clients) are admitted.
    let origin_check = move |req: &Request, response: Response| -> Result<Response, ErrorResponse> {
        match req.headers().get("Origin") {
            Some(origin) if origin.as_bytes() != allowed_origin.as_bytes() => {
                warn!("Rejected handshake from origin {:?}", origin);
                let mut resp = ErrorResponse::new(Some("Origin not allowed".to_string()));
                *resp.status_mut() = StatusCode::FORBIDDEN;
                Err(resp)
            }
            _ => Ok(response),
        }
    };
    let ws_stream = tokio_tungstenite::accept_hdr_async(stream, origin_check).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Connection-scoped user id, assigned here at the transport layer
    let client_id = ClientId::new();
    info!("Client {} connected from {}", client_id, peer_addr);

    // Create channel for server -> client events
    let (event_tx, mut event_rx) = mpsc::channel::<ServerEvent>(32);

    // Register with the coordinator
    if cmd_tx
        .send(Command::Connect {
            client_id,
            sender: event_tx,
        })
        .await
        .is_err()
    {
        error!("Failed to register client {} - coordinator closed", client_id);
        return Err(AppError::ChannelSend);
    }

    // Issue the connection-scoped id to the client
    let connected = ServerEvent::Connected { client_id };
    let json = serde_json::to_string(&connected)?;
    ws_sender.send(Message::Text(json.into())).await?;

    // Clone cmd_tx for read task
    let cmd_tx_read = cmd_tx.clone();

    // Spawn read task (WebSocket -> Command)
    let read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => {
                            let cmd = client_event_to_command(client_id, event);
                            if cmd_tx_read.send(cmd).await.is_err() {
                                debug!("Coordinator closed, ending read task for {}", client_id);
                                break;
                            }
                        }
                        Err(e) => {
                            // Availability over surfacing errors: a
                            // malformed event is logged and skipped
                            warn!("Invalid JSON from {}: {}", client_id, e);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("Client {} sent close frame", client_id);
                    break;
                }
                Ok(Message::Ping(_)) => {
                    // Pong is handled automatically by tungstenite
                    debug!("Ping from {}", client_id);
                }
                Ok(Message::Pong(_)) => {
                    debug!("Pong from {}", client_id);
                }
                Ok(_) => {
                    // Binary or other message types - ignore
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", client_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", client_id);
    });

    // Spawn write task (ServerEvent -> WebSocket)
    let write_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize event: {}", e);
                    // Continue - don't break on serialization errors
                }
            }
        }
        debug!("Write task ended for client");

        // Send close frame when done
        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete
    tokio::select! {
        _ = read_task => {
            debug!("Read task completed for {}", client_id);
        }
        _ = write_task => {
            debug!("Write task completed for {}", client_id);
        }
    }

    // Notify the coordinator; it performs the leave-room effects
    let _ = cmd_tx.send(Command::Disconnect { client_id }).await;

    info!("Client {} disconnected", client_id);

    Ok(())
}

/// Convert a ClientEvent to a coordinator Command
fn client_event_to_command(client_id: ClientId, event: ClientEvent) -> Command {
    match event {
        ClientEvent::CreateRoom => Command::CreateRoom { client_id },
        ClientEvent::CheckRoom { room_id } => Command::CheckRoom { client_id, room_id },
        ClientEvent::JoinRoom { room_id, name } => Command::JoinRoom {
            client_id,
            room_id,
            name,
        },
        ClientEvent::LeaveRoom => Command::LeaveRoom { client_id },
        ClientEvent::GetMates { user_id, room_id } => Command::GetMates {
            client_id,
            user_id,
            room_id,
        },
        ClientEvent::MessageSent { text } => Command::SendMessage { client_id, text },
        ClientEvent::SignalSent {
            from_id,
            to_id,
            data,
        } => Command::Signal {
            client_id,
            payload: SignalPayload {
                from_id,
                to_id,
                data,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoomId;

    #[test]
    fn test_event_to_command_join() {
        let client_id = ClientId::new();
        let cmd = client_event_to_command(
            client_id,
            ClientEvent::JoinRoom {
                room_id: RoomId("a1B2c3D4".to_string()),
                name: "Alice".to_string(),
            },
        );
        match cmd {
            Command::JoinRoom {
                client_id: id,
                room_id,
                name,
            } => {
                assert_eq!(id, client_id);
                assert_eq!(room_id.0, "a1B2c3D4");
                assert_eq!(name, "Alice");
            }
            other => panic!("Expected JoinRoom command, got {:?}", other),
        }
    }

    #[test]
    fn test_event_to_command_signal_keeps_payload() {
        let client_id = ClientId::new();
        let to_id = ClientId::new();
        let cmd = client_event_to_command(
            client_id,
            ClientEvent::SignalSent {
                from_id: client_id,
                to_id,
                data: serde_json::json!({"sdp": "answer"}),
            },
        );
        match cmd {
            Command::Signal { payload, .. } => {
                assert_eq!(payload.to_id, to_id);
                assert_eq!(payload.data, serde_json::json!({"sdp": "answer"}));
            }
            other => panic!("Expected Signal command, got {:?}", other),
        }
    }
}
