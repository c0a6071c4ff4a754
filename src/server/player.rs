//! Connected player model
//!
//! A player slot in the reference chat room, with the permissions the host
//! enforces for native chat.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::host::{Permission, PermissionSet};
use crate::models::{PlayerId, PlayerRecord};

/// A player connected to the chat room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Slot number, unique while connected
    pub id: PlayerId,
    /// Display name
    pub callsign: String,
    /// Team name, used for team chat
    pub team: String,
    /// Permissions currently held
    pub permissions: PermissionSet,
    /// When this player joined
    pub joined_at: DateTime<Utc>,
}

impl Player {
    pub fn new(
        id: PlayerId,
        callsign: impl Into<String>,
        team: impl Into<String>,
        permissions: PermissionSet,
    ) -> Self {
        Self {
            id,
            callsign: callsign.into(),
            team: team.into(),
            permissions,
            joined_at: Utc::now(),
        }
    }

    pub fn has_perm(&self, perm: Permission) -> bool {
        self.permissions.has(perm)
    }

    pub fn grant(&mut self, perm: Permission) {
        self.permissions.grant(perm);
    }

    pub fn revoke(&mut self, perm: Permission) {
        self.permissions.revoke(perm);
    }

    /// Whether `name` refers to this player, as `#slot` or a callsign
    pub fn matches(&self, name: &str) -> bool {
        match name.strip_prefix('#') {
            Some(slot) => slot.trim().parse::<PlayerId>().ok() == Some(self.id),
            None => self.callsign.eq_ignore_ascii_case(name.trim()),
        }
    }

    pub fn record(&self) -> PlayerRecord {
        PlayerRecord {
            player_id: self.id,
            callsign: self.callsign.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_player() -> Player {
        Player::new(
            3,
            "Tiger",
            "red",
            PermissionSet::from(Permission::default_player()),
        )
    }

    #[test]
    fn test_player_defaults() {
        let player = make_player();
        assert!(player.has_perm(Permission::Spawn));
        assert!(player.has_perm(Permission::Talk));
        assert!(!player.has_perm(Permission::Mute));
        assert_eq!(player.team, "red");
    }

    #[test]
    fn test_grant_and_revoke() {
        let mut player = make_player();
        player.revoke(Permission::Talk);
        assert!(!player.has_perm(Permission::Talk));

        player.grant(Permission::Talk);
        assert!(player.has_perm(Permission::Talk));
    }

    #[test]
    fn test_matches_slot_or_callsign() {
        let player = make_player();
        assert!(player.matches("#3"));
        assert!(player.matches("tiger"));
        assert!(player.matches("TIGER"));
        assert!(!player.matches("#4"));
        assert!(!player.matches("3"));
        assert!(!player.matches("Tig"));
    }

    #[test]
    fn test_record() {
        let record = make_player().record();
        assert_eq!(record.player_id, 3);
        assert_eq!(record.callsign, "Tiger");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&make_player()).unwrap();
        assert!(json.contains("callsign"));
        assert!(json.contains("permissions"));
        assert!(json.contains("joined_at"));
    }
}
