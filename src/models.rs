//! Core data types shared by the engine and hosts

use serde::{Deserialize, Serialize};

/// Player slot handle, unique for the lifetime of a connected session
pub type PlayerId = i32;

/// Where a chat message is addressed
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "target")]
pub enum Destination {
    /// Everyone on the server
    #[default]
    All,
    /// A single player (private message)
    Player(PlayerId),
    /// Every member of a team
    Team(String),
}

impl Destination {
    /// Whether delivering here requires the private message permission
    pub fn is_private(&self) -> bool {
        matches!(self, Destination::Player(_))
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::All => write!(f, "all"),
            Destination::Player(id) => write!(f, "player:{}", id),
            Destination::Team(team) => write!(f, "team:{}", team),
        }
    }
}

/// Who a message is sent as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Source {
    /// The server itself (notices, help text)
    Server,
    /// A connected player
    Player(PlayerId),
}

/// Minimal view of a player returned by host lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub callsign: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_display() {
        assert_eq!(Destination::All.to_string(), "all");
        assert_eq!(Destination::Player(3).to_string(), "player:3");
        assert_eq!(Destination::Team("red".into()).to_string(), "team:red");
    }

    #[test]
    fn test_destination_is_private() {
        assert!(Destination::Player(1).is_private());
        assert!(!Destination::All.is_private());
        assert!(!Destination::Team("blue".into()).is_private());
    }

    #[test]
    fn test_destination_serialization() {
        let json = serde_json::to_string(&Destination::Player(7)).unwrap();
        assert_eq!(json, r#"{"kind":"player","target":7}"#);

        let all: Destination = serde_json::from_str(r#"{"kind":"all"}"#).unwrap();
        assert_eq!(all, Destination::All);
    }
}
