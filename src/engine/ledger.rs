//! Pending grant ledger
//!
//! Records, per player, the forced messages that are expected to appear on
//! the raw chat stream. A player is a key only while escalated by the engine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Destination, PlayerId};

/// A forced message awaiting its echo on the raw chat stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingGrant {
    /// Where the message was sent
    pub destination: Destination,
    /// Exact payload expected on the raw stream
    pub message: String,
    /// When the escalation happened
    pub queued_at: DateTime<Utc>,
}

impl PendingGrant {
    pub fn new(destination: Destination, message: impl Into<String>) -> Self {
        Self {
            destination,
            message: message.into(),
            queued_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.queued_at >= ttl
    }
}

/// Player → pending grants, in escalation order
#[derive(Debug, Clone, Default)]
pub struct PendingLedger {
    entries: BTreeMap<PlayerId, Vec<PendingGrant>>,
}

impl PendingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the player currently has an entry (escalated by the engine)
    pub fn contains(&self, player: PlayerId) -> bool {
        self.entries.contains_key(&player)
    }

    /// Append a grant, creating the player's entry if absent
    pub fn push(&mut self, player: PlayerId, grant: PendingGrant) {
        self.entries.entry(player).or_default().push(grant);
    }

    /// Outstanding grants for a player (empty if none)
    pub fn grants(&self, player: PlayerId) -> &[PendingGrant] {
        self.entries.get(&player).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove and return the first grant whose payload equals `message`.
    ///
    /// Destinations are not compared. The entry stays in place even when it
    /// becomes empty; [`PendingLedger::take_satisfied`] purges it.
    pub fn take_match(&mut self, player: PlayerId, message: &str) -> Option<PendingGrant> {
        let grants = self.entries.get_mut(&player)?;
        let index = grants.iter().position(|g| g.message == message)?;
        Some(grants.remove(index))
    }

    /// Drop grants older than `ttl`, returning them with their owners
    pub fn expire(&mut self, now: DateTime<Utc>, ttl: Duration) -> Vec<(PlayerId, PendingGrant)> {
        let mut expired = Vec::new();
        for (player, grants) in self.entries.iter_mut() {
            let (stale, fresh): (Vec<_>, Vec<_>) =
                grants.drain(..).partition(|g| g.is_expired(now, ttl));
            *grants = fresh;
            expired.extend(stale.into_iter().map(|g| (*player, g)));
        }
        expired
    }

    /// Remove every entry with no outstanding grants, returning their players
    pub fn take_satisfied(&mut self) -> Vec<PlayerId> {
        let mut satisfied = Vec::new();
        self.entries.retain(|player, grants| {
            if grants.is_empty() {
                satisfied.push(*player);
                false
            } else {
                true
            }
        });
        satisfied
    }

    /// Remove a player's entry regardless of outstanding grants
    pub fn discard(&mut self, player: PlayerId) -> Option<Vec<PendingGrant>> {
        self.entries.remove(&player)
    }

    /// Players with an entry
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.entries.keys().copied()
    }

    /// Number of players with an entry
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
