//! Host environment interface
//!
//! The game server the helper runs inside. The engine never owns player
//! state; it queries and mutates permissions and sends messages through
//! this trait.

pub mod permission;

pub use permission::{Permission, PermissionSet, CHAT_PERMISSIONS};

use crate::models::{Destination, PlayerId, PlayerRecord, Source};

/// Operations the helper consumes from the hosting server
pub trait Host {
    fn has_perm(&self, player: PlayerId, perm: Permission) -> bool;

    /// Grant a permission. Granting one already held is a no-op.
    fn grant_perm(&mut self, player: PlayerId, perm: Permission);

    fn revoke_perm(&mut self, player: PlayerId, perm: Permission);

    /// Send a message. Messages sent as a player travel through the host's
    /// raw outbound chat stream before delivery.
    fn send_message(&mut self, from: Source, to: &Destination, message: &str);

    /// Look up a connected player by `#slot` or callsign
    fn lookup_player(&self, slot_or_callsign: &str) -> Option<PlayerRecord>;

    fn register_command(&mut self, name: &str);

    fn remove_command(&mut self, name: &str);

    /// Whether the player holds both permissions an escalation grants
    fn has_chat_perms(&self, player: PlayerId) -> bool {
        CHAT_PERMISSIONS.iter().all(|perm| self.has_perm(player, *perm))
    }

    /// Whether the player holds neither permission an escalation grants
    fn lacks_chat_perms(&self, player: PlayerId) -> bool {
        CHAT_PERMISSIONS.iter().all(|perm| !self.has_perm(player, *perm))
    }
}
