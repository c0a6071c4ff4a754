//! WebSocket message types for the muted chat protocol
//!
//! These types mirror the server's protocol. Some fields may not be used
//! directly by the CLI but are part of the complete protocol.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

pub type PlayerId = i32;

/// Where a chat message is addressed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "target")]
pub enum Destination {
    #[default]
    All,
    Player(PlayerId),
    Team(String),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::All => write!(f, "all"),
            Destination::Player(id) => write!(f, "player:{}", id),
            Destination::Team(team) => write!(f, "team:{}", team),
        }
    }
}

/// Messages from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        callsign: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        team: Option<String>,
    },
    Chat {
        to: Destination,
        message: String,
    },
    Command {
        channel: Destination,
        command: String,
        params: Vec<String>,
    },
    Leave,
}

/// Messages from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Joined {
        player_id: PlayerId,
        callsign: String,
        team: String,
        permissions: Vec<String>,
    },
    PlayerJoined {
        player_id: PlayerId,
        callsign: String,
        team: String,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    Chat {
        from: PlayerId,
        to: Destination,
        message: String,
    },
    Notice {
        message: String,
    },
    Error {
        message: String,
    },
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Joined {
                player_id,
                callsign,
                team,
                permissions,
            } => write!(
                f,
                "*** joined as {} (#{}, {}) [{}]",
                callsign,
                player_id,
                team,
                permissions.join(" ")
            ),
            ServerMessage::PlayerJoined {
                player_id,
                callsign,
                team,
            } => write!(f, "*** {} (#{}) joined the {} team", callsign, player_id, team),
            ServerMessage::PlayerLeft { player_id } => write!(f, "*** #{} left", player_id),
            ServerMessage::Chat { from, to, message } => match to {
                Destination::All => write!(f, "[#{}] {}", from, message),
                _ => write!(f, "[#{} -> {}] {}", from, to, message),
            },
            ServerMessage::Notice { message } => write!(f, "SERVER: {}", message),
            ServerMessage::Error { message } => write!(f, "ERROR: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let msg = ClientMessage::Command {
            channel: Destination::All,
            command: "icanfm".to_string(),
            params: vec!["20".to_string()],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "command");
        assert_eq!(json["channel"]["kind"], "all");
        assert_eq!(json["params"][0], "20");
    }

    #[test]
    fn test_join_skips_missing_team() {
        let msg = ClientMessage::Join {
            callsign: "Tiger".to_string(),
            team: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("team"));
    }

    #[test]
    fn test_server_chat_display() {
        let msg: ServerMessage = serde_json::from_str(
            r#"{"type":"chat","from":3,"to":{"kind":"player","target":1},"message":"Mid!"}"#,
        )
        .unwrap();
        assert_eq!(msg.to_string(), "[#3 -> player:1] Mid!");
    }
}
