//! In-memory chat room
//!
//! Implements the [`Host`] interface for the reference server. Messages sent
//! as a player are queued on the raw chat stream; server messages and
//! reconciled player messages are expanded into per-recipient deliveries.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::player::Player;
use crate::error::{AppError, Result};
use crate::host::{Host, Permission, PermissionSet};
use crate::models::{Destination, PlayerId, PlayerRecord, Source};

/// Maximum number of simultaneously connected players
pub const MAX_PLAYERS: usize = 200;

/// A player-originated message waiting for the raw chat stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChat {
    pub from: PlayerId,
    pub to: Destination,
    pub message: String,
}

/// A message ready to hand to one recipient's connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub recipient: PlayerId,
    pub from: Source,
    pub to: Destination,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ChatRoom {
    players: BTreeMap<PlayerId, Player>,
    commands: BTreeSet<String>,
    raw_queue: VecDeque<RawChat>,
    outbox: Vec<Delivery>,
}

impl ChatRoom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player in the lowest free slot
    pub fn add_player(
        &mut self,
        callsign: &str,
        team: &str,
        permissions: PermissionSet,
    ) -> Result<Player> {
        let callsign = callsign.trim();
        if callsign.is_empty() || callsign.starts_with('#') {
            return Err(AppError::BadRequest(format!("Invalid callsign: {:?}", callsign)));
        }
        if self.players.values().any(|p| p.callsign.eq_ignore_ascii_case(callsign)) {
            return Err(AppError::BadRequest(format!("Callsign already in use: {}", callsign)));
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(AppError::ServerFull(self.players.len()));
        }

        let id = (0..)
            .find(|slot| !self.players.contains_key(slot))
            .ok_or_else(|| AppError::Internal("No free player slot".to_string()))?;

        let player = Player::new(id, callsign, team, permissions);
        self.players.insert(id, player.clone());
        Ok(player)
    }

    /// Remove a player. Queued raw chat from them is dropped.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let removed = self.players.remove(&id);
        if removed.is_some() {
            self.raw_queue.retain(|raw| raw.from != id);
        }
        removed
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains(&name.to_ascii_lowercase())
    }

    /// Next player message awaiting reconciliation
    pub fn take_raw(&mut self) -> Option<RawChat> {
        self.raw_queue.pop_front()
    }

    /// Expand a message into deliveries for everyone who should receive it
    pub fn deliver(&mut self, from: Source, to: &Destination, message: &str) {
        let mut recipients: Vec<PlayerId> = match to {
            Destination::All => self.players.keys().copied().collect(),
            Destination::Player(id) => self
                .players
                .contains_key(id)
                .then_some(*id)
                .into_iter()
                .collect(),
            Destination::Team(team) => self
                .players
                .values()
                .filter(|p| p.team.eq_ignore_ascii_case(team))
                .map(|p| p.id)
                .collect(),
        };

        // Senders see their own private and team messages
        if let Source::Player(sender) = from {
            if self.players.contains_key(&sender) && !recipients.contains(&sender) {
                recipients.push(sender);
            }
        }

        self.outbox.extend(recipients.into_iter().map(|recipient| Delivery {
            recipient,
            from,
            to: to.clone(),
            message: message.to_string(),
        }));
    }

    pub fn drain_outbox(&mut self) -> Vec<Delivery> {
        std::mem::take(&mut self.outbox)
    }
}

impl Host for ChatRoom {
    fn has_perm(&self, player: PlayerId, perm: Permission) -> bool {
        self.players.get(&player).is_some_and(|p| p.has_perm(perm))
    }

    fn grant_perm(&mut self, player: PlayerId, perm: Permission) {
        if let Some(p) = self.players.get_mut(&player) {
            p.grant(perm);
        }
    }

    fn revoke_perm(&mut self, player: PlayerId, perm: Permission) {
        if let Some(p) = self.players.get_mut(&player) {
            p.revoke(perm);
        }
    }

    fn send_message(&mut self, from: Source, to: &Destination, message: &str) {
        match from {
            Source::Server => self.deliver(from, to, message),
            Source::Player(id) => self.raw_queue.push_back(RawChat {
                from: id,
                to: to.clone(),
                message: message.to_string(),
            }),
        }
    }

    fn lookup_player(&self, slot_or_callsign: &str) -> Option<PlayerRecord> {
        self.players
            .values()
            .find(|p| p.matches(slot_or_callsign))
            .map(Player::record)
    }

    fn register_command(&mut self, name: &str) {
        self.commands.insert(name.to_ascii_lowercase());
    }

    fn remove_command(&mut self, name: &str) {
        self.commands.remove(&name.to_ascii_lowercase());
    }
}
