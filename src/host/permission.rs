//! Permission model for players
//!
//! Defines the permission flags the host tracks per player.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Permissions a player may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// Can spawn into the game (a playing participant, not a spectator)
    Spawn,
    /// Can send public and team chat
    Talk,
    /// Can send private messages to a single player
    #[serde(rename = "PRIVATEMESSAGE")]
    PrivateMessage,
    /// Can mute other players
    Mute,
}

/// The two permissions an escalation grants and the sweeper revokes
pub const CHAT_PERMISSIONS: [Permission; 2] = [Permission::Talk, Permission::PrivateMessage];

impl Permission {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Spawn => "SPAWN",
            Permission::Talk => "TALK",
            Permission::PrivateMessage => "PRIVATEMESSAGE",
            Permission::Mute => "MUTE",
        }
    }

    /// Permissions for a regular player joining the server
    pub fn default_player() -> HashSet<Permission> {
        let mut perms = HashSet::new();
        perms.insert(Permission::Spawn);
        perms.insert(Permission::Talk);
        perms.insert(Permission::PrivateMessage);
        perms
    }

    /// Permissions for a player who joins already muted
    pub fn default_muted() -> HashSet<Permission> {
        let mut perms = HashSet::new();
        perms.insert(Permission::Spawn);
        perms
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of permissions with helper methods
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: HashSet<Permission>,
}

impl PermissionSet {
    /// Create a new empty permission set
    pub fn new() -> Self {
        Self {
            permissions: HashSet::new(),
        }
    }

    pub fn has(&self, perm: Permission) -> bool {
        self.permissions.contains(&perm)
    }

    /// Add a permission; adding one already held is a no-op
    pub fn grant(&mut self, perm: Permission) {
        self.permissions.insert(perm);
    }

    pub fn revoke(&mut self, perm: Permission) {
        self.permissions.remove(&perm);
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Sorted list for stable serialization
    pub fn to_vec(&self) -> Vec<Permission> {
        let mut perms: Vec<Permission> = self.permissions.iter().copied().collect();
        perms.sort_by_key(|p| p.as_str());
        perms
    }
}

impl From<HashSet<Permission>> for PermissionSet {
    fn from(permissions: HashSet<Permission>) -> Self {
        Self { permissions }
    }
}

impl From<Vec<Permission>> for PermissionSet {
    fn from(permissions: Vec<Permission>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_as_str() {
        assert_eq!(Permission::Spawn.as_str(), "SPAWN");
        assert_eq!(Permission::Talk.as_str(), "TALK");
        assert_eq!(Permission::PrivateMessage.as_str(), "PRIVATEMESSAGE");
        assert_eq!(Permission::Mute.as_str(), "MUTE");
    }

    #[test]
    fn test_default_player_permissions() {
        let perms = Permission::default_player();
        assert!(perms.contains(&Permission::Spawn));
        assert!(perms.contains(&Permission::Talk));
        assert!(perms.contains(&Permission::PrivateMessage));
        assert!(!perms.contains(&Permission::Mute));
    }

    #[test]
    fn test_default_muted_permissions() {
        let perms = Permission::default_muted();
        assert!(perms.contains(&Permission::Spawn));
        assert!(!perms.contains(&Permission::Talk));
        assert!(!perms.contains(&Permission::PrivateMessage));
    }

    #[test]
    fn test_permission_set_grant_is_idempotent() {
        let mut perms = PermissionSet::new();
        assert!(perms.is_empty());

        perms.grant(Permission::Talk);
        perms.grant(Permission::Talk);
        assert_eq!(perms.to_vec(), vec![Permission::Talk]);

        perms.revoke(Permission::Talk);
        assert!(!perms.has(Permission::Talk));
        assert!(perms.is_empty());
    }

    #[test]
    fn test_permission_serialization() {
        let json = serde_json::to_string(&Permission::PrivateMessage).unwrap();
        assert_eq!(json, "\"PRIVATEMESSAGE\"");

        let perm: Permission = serde_json::from_str("\"TALK\"").unwrap();
        assert_eq!(perm, Permission::Talk);
    }

    #[test]
    fn test_permission_set_to_vec_sorted() {
        let perms: PermissionSet = vec![Permission::Talk, Permission::Mute, Permission::Spawn].into();
        assert_eq!(
            perms.to_vec(),
            vec![Permission::Mute, Permission::Spawn, Permission::Talk]
        );
    }
}
