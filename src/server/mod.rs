//! Reference chat host
//!
//! An in-memory chat server that runs the muted chat helper the way a game
//! server would: every event is processed to completion under one lock,
//! player chat passes through the raw stream before delivery, and a
//! periodic task drives the scheduling tick.

pub mod player;
pub mod room;
pub mod websocket;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{EngineConfig, JoinPolicy, ServerConfig};
use crate::engine::PendingGrant;
use crate::error::{AppError, CommandError, Result};
use crate::host::{Host, Permission, PermissionSet, CHAT_PERMISSIONS};
use crate::models::{Destination, PlayerId, Source};
use crate::plugin::MutedChatHelper;
use player::Player;
use room::ChatRoom;
use websocket::ServerMessage;

/// Team assigned when a client does not pick one
pub const DEFAULT_TEAM: &str = "rogue";

/// The chat room, the helper plugin and the open connections
pub struct ChatServer {
    room: ChatRoom,
    helper: MutedChatHelper,
    policy: JoinPolicy,
    connections: HashMap<PlayerId, mpsc::UnboundedSender<ServerMessage>>,
}

impl ChatServer {
    /// Create a server and load the helper into it
    pub fn new(engine: &EngineConfig, policy: JoinPolicy) -> Self {
        let mut room = ChatRoom::new();
        let mut helper = MutedChatHelper::new(engine);
        helper.init(&mut room);
        tracing::info!(plugin = helper.name(), "Plugin loaded");

        Self {
            room,
            helper,
            policy,
            connections: HashMap::new(),
        }
    }

    pub fn room(&self) -> &ChatRoom {
        &self.room
    }

    pub fn helper(&self) -> &MutedChatHelper {
        &self.helper
    }

    /// Seat a new player and raise the join event
    pub fn join(
        &mut self,
        callsign: &str,
        team: Option<&str>,
        tx: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<Player> {
        let mut permissions = if self.policy.is_muted(callsign) {
            PermissionSet::from(Permission::default_muted())
        } else {
            PermissionSet::from(Permission::default_player())
        };
        if self.policy.is_operator(callsign) {
            permissions.grant(Permission::Mute);
        }

        let player = self
            .room
            .add_player(callsign, team.unwrap_or(DEFAULT_TEAM), permissions)?;
        tracing::info!(player_id = player.id, callsign = %player.callsign, "Player joined");

        let _ = tx.send(ServerMessage::Joined {
            player_id: player.id,
            callsign: player.callsign.clone(),
            team: player.team.clone(),
            permissions: player.permissions.to_vec(),
        });
        self.broadcast_except(
            player.id,
            ServerMessage::PlayerJoined {
                player_id: player.id,
                callsign: player.callsign.clone(),
                team: player.team.clone(),
            },
        );
        self.connections.insert(player.id, tx);

        self.helper.on_player_join(&mut self.room, player.id);
        self.flush();

        Ok(player)
    }

    /// Raise the part event and free the slot
    pub fn leave(&mut self, player_id: PlayerId) {
        if self.room.player(player_id).is_none() {
            return;
        }

        self.helper.on_player_part(player_id);
        self.room.remove_player(player_id);
        self.connections.remove(&player_id);
        tracing::info!(player_id, "Player left");

        self.broadcast_except(player_id, ServerMessage::PlayerLeft { player_id });
        self.flush();
    }

    /// Native chat typed by a player
    pub fn chat(&mut self, from: PlayerId, to: Destination, message: &str) -> Result<()> {
        self.require_player(from)?;
        if message.trim().is_empty() {
            return Ok(());
        }

        if !self.room.has_perm(from, Permission::Talk) {
            self.notice(from, "You do not have permission to talk on this server.");
        } else if to.is_private() && !self.room.has_perm(from, Permission::PrivateMessage) {
            self.notice(from, "You do not have permission to send private messages.");
        } else if let Destination::Player(id) = to {
            if self.room.player(id).is_none() {
                self.notice(from, "Unknown recipient.");
            } else {
                self.room.send_message(Source::Player(from), &to, message);
            }
        } else {
            self.room.send_message(Source::Player(from), &to, message);
        }

        self.flush();
        Ok(())
    }

    /// Slash command typed by a player on `channel`
    pub fn command(
        &mut self,
        from: PlayerId,
        channel: &Destination,
        command: &str,
        params: &[String],
    ) -> Result<()> {
        self.require_player(from)?;

        let handled = self.room.has_command(command)
            && self
                .helper
                .slash_command(&mut self.room, from, channel, command, params);

        if !handled {
            self.native_command(from, command, params);
        }

        self.flush();
        Ok(())
    }

    /// Scheduling tick
    pub fn tick(&mut self) -> Vec<PlayerId> {
        let revoked = self.helper.on_tick(&mut self.room);
        self.flush();
        revoked
    }

    /// Unload the helper
    pub fn shutdown(&mut self) {
        self.helper.cleanup(&mut self.room);
        tracing::info!(plugin = self.helper.name(), "Plugin unloaded");
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let engine = self.helper.engine();
        StatusSnapshot {
            plugin: self.helper.name(),
            players: self.room.players().cloned().collect(),
            escalated: engine
                .ledger()
                .players()
                .map(|player_id| EscalatedPlayer {
                    player_id,
                    pending: engine.ledger().grants(player_id).to_vec(),
                })
                .collect(),
            manually_muted: engine.mutes().players().collect(),
        }
    }

    /// Built-in handling for commands the helper did not take
    fn native_command(&mut self, from: PlayerId, command: &str, params: &[String]) {
        let name = command.to_ascii_lowercase();
        let unmute = match name.as_str() {
            "mute" => false,
            "unmute" => true,
            _ => {
                self.notice(from, &format!("Unknown command [{}]", command));
                return;
            }
        };

        if !self.room.has_perm(from, Permission::Mute) {
            self.notice(from, &format!("You do not have permission to run the /{} command.", name));
            return;
        }
        let [target] = params else {
            self.notice(from, &format!("Usage: /{} <callsign | #slot>", name));
            return;
        };
        let Some(record) = self.room.lookup_player(target) else {
            self.notice(from, &CommandError::PlayerNotFound(target.clone()).to_string());
            return;
        };

        for perm in CHAT_PERMISSIONS {
            if unmute {
                self.room.grant_perm(record.player_id, perm);
            } else {
                self.room.revoke_perm(record.player_id, perm);
            }
        }

        let operator = self
            .room
            .player(from)
            .map(|p| p.callsign.clone())
            .unwrap_or_default();
        if unmute {
            self.helper.on_unmute(record.player_id);
            self.notice(from, &format!("Unmuted {}.", record.callsign));
            self.notice(record.player_id, &format!("You have been unmuted by {}.", operator));
        } else {
            self.notice(from, &format!("Muted {}.", record.callsign));
            self.notice(record.player_id, &format!("You have been muted by {}.", operator));
        }
        tracing::info!(operator_id = from, player_id = record.player_id, unmute, "Native mute command");
    }

    /// Reconcile queued raw chat, then hand deliveries to connections
    fn flush(&mut self) {
        while let Some(mut raw) = self.room.take_raw() {
            let outcome = self.helper.on_raw_chat(raw.from, &mut raw.message);
            tracing::trace!(player_id = raw.from, ?outcome, "Raw chat reconciled");
            if !outcome.allows() || raw.message.is_empty() {
                continue;
            }
            self.room.deliver(Source::Player(raw.from), &raw.to, &raw.message);
        }

        for delivery in self.room.drain_outbox() {
            if let Some(tx) = self.connections.get(&delivery.recipient) {
                if tx.send(delivery.into()).is_err() {
                    tracing::debug!("Dropped message for closed connection");
                }
            }
        }
    }

    fn notice(&mut self, player: PlayerId, message: &str) {
        self.room
            .send_message(Source::Server, &Destination::Player(player), message);
    }

    fn broadcast_except(&self, skip: PlayerId, message: ServerMessage) {
        for (id, tx) in &self.connections {
            if *id != skip {
                let _ = tx.send(message.clone());
            }
        }
    }

    fn require_player(&self, id: PlayerId) -> Result<&Player> {
        self.room
            .player(id)
            .ok_or_else(|| AppError::NotFound(format!("Player {}", id)))
    }
}

/// Player with outstanding pending grants
#[derive(Debug, Clone, Serialize)]
pub struct EscalatedPlayer {
    pub player_id: PlayerId,
    pub pending: Vec<PendingGrant>,
}

/// Point-in-time view of the server for the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub plugin: &'static str,
    pub players: Vec<Player>,
    pub escalated: Vec<EscalatedPlayer>,
    pub manually_muted: Vec<PlayerId>,
}

/// Application state shared across handlers
pub struct AppState {
    pub server: Mutex<ChatServer>,
    pub tick_interval: Duration,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Arc<Self> {
        Arc::new(Self {
            server: Mutex::new(ChatServer::new(&config.engine(), config.join_policy())),
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1)),
        })
    }

    pub fn with_server(server: ChatServer, tick_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            server: Mutex::new(server),
            tick_interval,
        })
    }
}

/// HTTP and WebSocket routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/players/:id", get(get_player))
        .route("/ws", get(websocket::handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Drive the scheduling tick until the state is dropped by every other owner
pub fn spawn_ticker(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if Arc::strong_count(&state) == 1 {
                break;
            }
            state.server.lock().await.tick();
        }
    })
}

async fn health() -> &'static str {
    "ok"
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    Json(state.server.lock().await.snapshot())
}

async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PlayerId>,
) -> Result<Json<Player>> {
    let server = state.server.lock().await;
    let player = server.require_player(id)?;
    Ok(Json(player.clone()))
}
