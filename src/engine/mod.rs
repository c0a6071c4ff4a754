//! Escalation engine
//!
//! Lets a player without chat permissions send one whitelisted message:
//! - escalation grants TALK and PRIVATEMESSAGE, sends the message and records
//!   a pending grant
//! - reconciliation matches raw outbound chat against pending grants,
//!   letting the forced message through and suppressing anything else
//! - the per-tick sweep revokes the permissions once every pending grant of
//!   a player is satisfied

pub mod ledger;
pub mod mute;

pub use ledger::{PendingGrant, PendingLedger};
pub use mute::ManualMuteRegistry;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::host::{Host, CHAT_PERMISSIONS};
use crate::models::{Destination, PlayerId, Source};

/// Outcome of reconciling one raw chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconciliation {
    /// Sender is not escalated by the engine; message untouched
    Unescalated,
    /// Message matched a pending grant, which was consumed
    Satisfied,
    /// Sender is escalated but the message matched nothing; payload cleared
    Suppressed,
}

impl Reconciliation {
    /// Whether the message may leave the server
    pub fn allows(&self) -> bool {
        !matches!(self, Reconciliation::Suppressed)
    }
}

/// Owns the pending grant ledger and the manual mute registry
#[derive(Debug, Clone, Default)]
pub struct EscalationEngine {
    ledger: PendingLedger,
    mutes: ManualMuteRegistry,
    pending_grant_ttl: Option<Duration>,
}

impl EscalationEngine {
    pub fn new(config: &EngineConfig) -> Self {
        let pending_grant_ttl = config
            .pending_grant_ttl_secs
            .and_then(|secs| Duration::from_std(std::time::Duration::from_secs(secs)).ok());

        Self {
            ledger: PendingLedger::new(),
            mutes: ManualMuteRegistry::new(),
            pending_grant_ttl,
        }
    }

    pub fn ledger(&self) -> &PendingLedger {
        &self.ledger
    }

    pub fn mutes(&self) -> &ManualMuteRegistry {
        &self.mutes
    }

    pub fn mutes_mut(&mut self) -> &mut ManualMuteRegistry {
        &mut self.mutes
    }

    /// Whether the player currently holds permissions granted by the engine
    pub fn is_escalated(&self, player: PlayerId) -> bool {
        self.ledger.contains(player)
    }

    pub fn is_manually_muted(&self, player: PlayerId) -> bool {
        self.mutes.is_muted(player)
    }

    /// Send `message` as `from`, escalating their permissions if needed.
    ///
    /// A player that already holds both chat permissions and has no pending
    /// grant is sent for directly without touching any state.
    pub fn send_forced_message<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        from: PlayerId,
        to: &Destination,
        message: &str,
    ) {
        if !self.ledger.contains(from) && host.has_chat_perms(from) {
            host.send_message(Source::Player(from), to, message);
            return;
        }

        for perm in CHAT_PERMISSIONS {
            host.grant_perm(from, perm);
        }

        host.send_message(Source::Player(from), to, message);

        self.ledger.push(from, PendingGrant::new(to.clone(), message));

        tracing::info!(
            player_id = from,
            destination = %to,
            pending = self.ledger.grants(from).len(),
            "Escalated chat permissions for forced message"
        );
    }

    /// Reconcile a raw outbound chat message from `from`.
    ///
    /// Suppressed messages have their payload cleared in place.
    pub fn reconcile(&mut self, from: PlayerId, message: &mut String) -> Reconciliation {
        if !self.ledger.contains(from) {
            return Reconciliation::Unescalated;
        }

        if self.ledger.take_match(from, message).is_some() {
            tracing::debug!(
                player_id = from,
                remaining = self.ledger.grants(from).len(),
                "Pending grant satisfied"
            );
            return Reconciliation::Satisfied;
        }

        tracing::warn!(
            player_id = from,
            pending = self.ledger.grants(from).len(),
            "Suppressed chat from escalated player"
        );
        message.clear();
        Reconciliation::Suppressed
    }

    /// Revoke chat permissions for every player whose grants are all satisfied
    pub fn sweep<H: Host + ?Sized>(&mut self, host: &mut H) -> Vec<PlayerId> {
        self.sweep_at(host, Utc::now())
    }

    /// [`EscalationEngine::sweep`] with an explicit clock
    pub fn sweep_at<H: Host + ?Sized>(&mut self, host: &mut H, now: DateTime<Utc>) -> Vec<PlayerId> {
        if let Some(ttl) = self.pending_grant_ttl {
            for (player, grant) in self.ledger.expire(now, ttl) {
                tracing::warn!(
                    player_id = player,
                    message = %grant.message,
                    queued_at = %grant.queued_at,
                    "Pending grant expired without echo"
                );
            }
        }

        let revoked = self.ledger.take_satisfied();
        for player in &revoked {
            for perm in CHAT_PERMISSIONS {
                host.revoke_perm(*player, perm);
            }
            tracing::info!(player_id = *player, "Revoked escalated chat permissions");
        }
        revoked
    }

    /// Drop all state for a departed player without revoking anything
    pub fn forget(&mut self, player: PlayerId) {
        if let Some(dropped) = self.ledger.discard(player) {
            if !dropped.is_empty() {
                tracing::debug!(
                    player_id = player,
                    dropped = dropped.len(),
                    "Discarded unsatisfied pending grants"
                );
            }
        }
        self.mutes.unmute(player);
    }

    /// Stop tracking an escalation whose permissions the host now grants
    /// natively. Nothing is revoked.
    pub fn release(&mut self, player: PlayerId) {
        if let Some(dropped) = self.ledger.discard(player) {
            tracing::info!(
                player_id = player,
                unsatisfied = dropped.len(),
                "Escalation released to native permissions"
            );
        }
    }

    pub fn clear(&mut self) {
        self.ledger.clear();
        self.mutes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Permission, PermissionSet};
    use crate::server::room::ChatRoom;

    fn room_with(perms: Vec<Permission>) -> (ChatRoom, PlayerId) {
        let mut room = ChatRoom::new();
        let player = room
            .add_player("Tester", "red", PermissionSet::from(perms))
            .unwrap();
        (room, player.id)
    }

    fn muted_room() -> (ChatRoom, PlayerId) {
        room_with(vec![Permission::Spawn])
    }

    #[test]
    fn test_fast_path_leaves_state_untouched() {
        let (mut room, id) = room_with(vec![
            Permission::Spawn,
            Permission::Talk,
            Permission::PrivateMessage,
        ]);
        let mut engine = EscalationEngine::default();

        engine.send_forced_message(&mut room, id, &Destination::All, "Ours!");

        assert!(!engine.is_escalated(id));
        let raw = room.take_raw().unwrap();
        assert_eq!(raw.from, id);
        assert_eq!(raw.message, "Ours!");
        assert!(engine.sweep(&mut room).is_empty());
        assert!(room.has_perm(id, Permission::Talk));
    }

    #[test]
    fn test_escalation_grants_and_records() {
        let (mut room, id) = muted_room();
        let mut engine = EscalationEngine::default();

        engine.send_forced_message(&mut room, id, &Destination::Team("red".into()), "Attack!");

        assert!(room.has_perm(id, Permission::Talk));
        assert!(room.has_perm(id, Permission::PrivateMessage));
        let grants = engine.ledger().grants(id);
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].destination, Destination::Team("red".into()));
        assert_eq!(grants[0].message, "Attack!");
        assert_eq!(room.take_raw().unwrap().message, "Attack!");
    }

    #[test]
    fn test_escalated_player_with_perms_still_records() {
        let (mut room, id) = muted_room();
        let mut engine = EscalationEngine::default();

        engine.send_forced_message(&mut room, id, &Destination::All, "Ours!");
        // Holds both permissions now, but has a pending entry
        engine.send_forced_message(&mut room, id, &Destination::All, "Mid!");

        assert_eq!(engine.ledger().grants(id).len(), 2);
    }

    #[test]
    fn test_reconcile_unescalated_passes_through() {
        let mut engine = EscalationEngine::default();
        let mut message = "hello".to_string();

        assert_eq!(engine.reconcile(1, &mut message), Reconciliation::Unescalated);
        assert_eq!(message, "hello");
    }

    #[test]
    fn test_reconcile_satisfies_then_sweep_revokes() {
        let (mut room, id) = muted_room();
        let mut engine = EscalationEngine::default();
        engine.send_forced_message(&mut room, id, &Destination::All, "Attack!");

        let mut message = "Attack!".to_string();
        assert_eq!(engine.reconcile(id, &mut message), Reconciliation::Satisfied);
        assert_eq!(message, "Attack!");
        assert!(engine.is_escalated(id));

        assert_eq!(engine.sweep(&mut room), vec![id]);
        assert!(!engine.is_escalated(id));
        assert!(!room.has_perm(id, Permission::Talk));
        assert!(!room.has_perm(id, Permission::PrivateMessage));
    }

    #[test]
    fn test_reconcile_suppresses_unmatched() {
        let (mut room, id) = muted_room();
        let mut engine = EscalationEngine::default();
        engine.send_forced_message(&mut room, id, &Destination::All, "Ours!");

        let mut message = "anything else".to_string();
        let outcome = engine.reconcile(id, &mut message);

        assert_eq!(outcome, Reconciliation::Suppressed);
        assert!(!outcome.allows());
        assert!(message.is_empty());
        assert_eq!(engine.ledger().grants(id).len(), 1);
        assert!(engine.sweep(&mut room).is_empty());
        assert!(room.has_perm(id, Permission::Talk));
    }

    #[test]
    fn test_duplicate_grants_matched_one_at_a_time() {
        let (mut room, id) = muted_room();
        let mut engine = EscalationEngine::default();
        engine.send_forced_message(&mut room, id, &Destination::All, "Defend!");
        engine.send_forced_message(&mut room, id, &Destination::Player(9), "Defend!");

        let mut first = "Defend!".to_string();
        assert_eq!(engine.reconcile(id, &mut first), Reconciliation::Satisfied);
        assert!(engine.sweep(&mut room).is_empty());
        assert!(room.has_perm(id, Permission::Talk));

        let mut second = "Defend!".to_string();
        assert_eq!(engine.reconcile(id, &mut second), Reconciliation::Satisfied);
        assert_eq!(engine.sweep(&mut room), vec![id]);
        assert!(!room.has_perm(id, Permission::Talk));
    }

    #[test]
    fn test_forget_discards_without_revoking() {
        let (mut room, id) = muted_room();
        let mut engine = EscalationEngine::default();
        engine.send_forced_message(&mut room, id, &Destination::All, "Mid!");
        engine.mutes_mut().mute(id);

        engine.forget(id);

        assert!(!engine.is_escalated(id));
        assert!(!engine.is_manually_muted(id));
        assert!(engine.sweep(&mut room).is_empty());
        // Nothing revoked on departure
        assert!(room.has_perm(id, Permission::Talk));
    }

    #[test]
    fn test_release_keeps_permissions_through_sweep() {
        let (mut room, id) = muted_room();
        let mut engine = EscalationEngine::default();
        engine.send_forced_message(&mut room, id, &Destination::All, "Ours!");
        let mut echo = "Ours!".to_string();
        engine.reconcile(id, &mut echo);

        engine.release(id);

        assert!(!engine.is_escalated(id));
        assert!(engine.sweep(&mut room).is_empty());
        assert!(room.has_perm(id, Permission::Talk));
        assert!(room.has_perm(id, Permission::PrivateMessage));
    }

    #[test]
    fn test_unbounded_window_by_default() {
        let (mut room, id) = muted_room();
        let mut engine = EscalationEngine::default();
        engine.send_forced_message(&mut room, id, &Destination::All, "Ours!");

        let later = Utc::now() + Duration::days(7);
        assert!(engine.sweep_at(&mut room, later).is_empty());
        assert!(engine.is_escalated(id));
    }

    #[test]
    fn test_configured_ttl_expires_and_revokes() {
        let (mut room, id) = muted_room();
        let config = EngineConfig {
            pending_grant_ttl_secs: Some(10),
            ..EngineConfig::default()
        };
        let mut engine = EscalationEngine::new(&config);
        engine.send_forced_message(&mut room, id, &Destination::All, "Ours!");

        assert!(engine.sweep_at(&mut room, Utc::now()).is_empty());

        let later = Utc::now() + Duration::seconds(11);
        assert_eq!(engine.sweep_at(&mut room, later), vec![id]);
        assert!(!room.has_perm(id, Permission::Talk));
    }

    #[test]
    fn test_clear() {
        let (mut room, id) = muted_room();
        let mut engine = EscalationEngine::default();
        engine.send_forced_message(&mut room, id, &Destination::All, "Ours!");
        engine.mutes_mut().mute(id);

        engine.clear();
        assert!(engine.ledger().is_empty());
        assert!(engine.mutes().is_empty());
    }
}
