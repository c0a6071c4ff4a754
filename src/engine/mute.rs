//! Manual mute registry
//!
//! Players an operator muted by command. Membership vetoes every
//! whitelist phrase, independent of the player's permissions.

use std::collections::BTreeSet;

use crate::models::PlayerId;

#[derive(Debug, Clone, Default)]
pub struct ManualMuteRegistry {
    players: BTreeSet<PlayerId>,
}

impl ManualMuteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player. Muting an already muted player is a no-op.
    pub fn mute(&mut self, player: PlayerId) {
        self.players.insert(player);
    }

    /// Remove a player, returning whether they were muted
    pub fn unmute(&mut self, player: PlayerId) -> bool {
        self.players.remove(&player)
    }

    pub fn is_muted(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }
}
