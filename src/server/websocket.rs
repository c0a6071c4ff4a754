//! WebSocket server handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::room::Delivery;
use super::AppState;
use crate::error::AppError;
use crate::host::Permission;
use crate::models::{Destination, PlayerId, Source};

/// WebSocket handler
pub async fn handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(text)).await {
                tracing::debug!("WebSocket send failed: {}", e);
                break;
            }
        }
    });

    let mut player_id: Option<PlayerId> = None;

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
        };

        let client_msg = match serde_json::from_str::<ClientMessage>(&msg).map_err(AppError::from) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!("Rejected client message: {}", e);
                send_error(&tx, e.to_string());
                continue;
            }
        };

        let result = match (client_msg, player_id) {
            (ClientMessage::Join { callsign, team }, None) => {
                let mut server = state.server.lock().await;
                server
                    .join(&callsign, team.as_deref(), tx.clone())
                    .map(|player| {
                        player_id = Some(player.id);
                    })
            }
            (ClientMessage::Join { .. }, Some(_)) => {
                send_error(&tx, "Already joined".to_string());
                Ok(())
            }
            (ClientMessage::Leave, _) => break,
            (_, None) => {
                send_error(&tx, "Join before sending chat or commands".to_string());
                Ok(())
            }
            (ClientMessage::Chat { to, message }, Some(id)) => {
                state.server.lock().await.chat(id, to, &message)
            }
            (
                ClientMessage::Command {
                    channel,
                    command,
                    params,
                },
                Some(id),
            ) => state
                .server
                .lock()
                .await
                .command(id, &channel, &command, &params),
        };

        if let Err(e) = result {
            send_error(&tx, e.to_string());
        }
    }

    if let Some(id) = player_id {
        state.server.lock().await.leave(id);
    }
    drop(tx);
    let _ = writer.await;
}

fn send_error(tx: &mpsc::UnboundedSender<ServerMessage>, message: String) {
    if tx.send(ServerMessage::Error { message }).is_err() {
        tracing::debug!("Connection closed before error could be sent");
    }
}

/// Messages from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Take a player slot
    Join {
        callsign: String,
        #[serde(default)]
        team: Option<String>,
    },
    /// Native chat
    Chat {
        #[serde(default)]
        to: Destination,
        message: String,
    },
    /// Slash command, typed on `channel`
    Command {
        #[serde(default)]
        channel: Destination,
        command: String,
        #[serde(default)]
        params: Vec<String>,
    },
    Leave,
}

/// Messages from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent to a player once their slot is assigned
    Joined {
        player_id: PlayerId,
        callsign: String,
        team: String,
        permissions: Vec<Permission>,
    },
    PlayerJoined {
        player_id: PlayerId,
        callsign: String,
        team: String,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    /// Chat from another player (or the recipient's own echo)
    Chat {
        from: PlayerId,
        to: Destination,
        message: String,
    },
    /// Message from the server
    Notice {
        message: String,
    },
    Error {
        message: String,
    },
}

impl From<Delivery> for ServerMessage {
    fn from(delivery: Delivery) -> Self {
        match delivery.from {
            Source::Server => ServerMessage::Notice {
                message: delivery.message,
            },
            Source::Player(from) => ServerMessage::Chat {
                from,
                to: delivery.to,
                message: delivery.message,
            },
        }
    }
}
