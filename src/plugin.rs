//! Muted chat helper plugin
//!
//! Typed entry points the host calls, one per event kind, wired to the
//! escalation engine and the whitelist command vocabulary.

use crate::commands::{WhitelistCommand, COMMAND_NAMES, HELP_LINES, MUTE_COMMAND};
use crate::config::EngineConfig;
use crate::engine::{EscalationEngine, Reconciliation};
use crate::error::CommandError;
use crate::host::{Host, Permission};
use crate::models::{Destination, PlayerId, Source};

pub struct MutedChatHelper {
    engine: EscalationEngine,
    match_durations: Vec<u32>,
}

impl MutedChatHelper {
    pub const NAME: &'static str = "Muted Chat Helper";

    pub fn new(config: &EngineConfig) -> Self {
        Self {
            engine: EscalationEngine::new(config),
            match_durations: config.match_durations.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn engine(&self) -> &EscalationEngine {
        &self.engine
    }

    /// Register every command name with the host
    pub fn init<H: Host + ?Sized>(&mut self, host: &mut H) {
        for name in COMMAND_NAMES {
            host.register_command(name);
        }
        tracing::debug!(commands = COMMAND_NAMES.len(), "Muted chat helper loaded");
    }

    /// Remove command names and drop all engine state
    pub fn cleanup<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.engine.clear();
        for name in COMMAND_NAMES {
            host.remove_command(name);
        }
        tracing::debug!("Muted chat helper unloaded");
    }

    /// Show the whitelist help to a player who joins unable to chat
    pub fn on_player_join<H: Host + ?Sized>(&mut self, host: &mut H, player: PlayerId) {
        if !host.has_perm(player, Permission::Spawn)
            || !host.lacks_chat_perms(player)
            || self.engine.is_manually_muted(player)
        {
            return;
        }

        let to = Destination::Player(player);
        for line in HELP_LINES {
            host.send_message(Source::Server, &to, line);
        }
    }

    /// Reconcile a raw outbound chat message before it leaves the server
    pub fn on_raw_chat(&mut self, from: PlayerId, message: &mut String) -> Reconciliation {
        self.engine.reconcile(from, message)
    }

    /// Scheduling tick: revoke permissions of satisfied escalations
    pub fn on_tick<H: Host + ?Sized>(&mut self, host: &mut H) -> Vec<PlayerId> {
        self.engine.sweep(host)
    }

    pub fn on_player_part(&mut self, player: PlayerId) {
        self.engine.forget(player);
    }

    /// The host unmuted `victim`: whitelist phrases are allowed again, and
    /// chat permissions are now the host's, so the sweep must not revoke them
    pub fn on_unmute(&mut self, victim: PlayerId) {
        if self.engine.mutes_mut().unmute(victim) {
            tracing::info!(player_id = victim, "Manual mute lifted");
        }
        self.engine.release(victim);
    }

    /// Handle a slash command. Returning `false` lets the host's built-in
    /// handling run.
    pub fn slash_command<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        player: PlayerId,
        channel: &Destination,
        command: &str,
        params: &[String],
    ) -> bool {
        if !host.has_perm(player, Permission::Spawn) {
            return false;
        }

        if command.eq_ignore_ascii_case(MUTE_COMMAND) {
            return self.mute(host, player, params);
        }

        let Some(whitelisted) = WhitelistCommand::from_name(command) else {
            return false;
        };

        if self.engine.is_manually_muted(player) {
            tracing::debug!(player_id = player, command, "Whitelist command vetoed by manual mute");
            return true;
        }

        match whitelisted.phrase(params, &self.match_durations) {
            Ok(phrase) => self.engine.send_forced_message(host, player, channel, &phrase),
            Err(e) => notify(host, player, &e),
        }

        true
    }

    fn mute<H: Host + ?Sized>(&mut self, host: &mut H, operator: PlayerId, params: &[String]) -> bool {
        let [target] = params else {
            return false;
        };
        if !host.has_perm(operator, Permission::Mute) {
            return false;
        }

        let Some(record) = host.lookup_player(target) else {
            notify(host, operator, &CommandError::PlayerNotFound(target.clone()));
            return true;
        };

        self.engine.mutes_mut().mute(record.player_id);
        tracing::info!(
            operator_id = operator,
            player_id = record.player_id,
            "Whitelist commands disabled by manual mute"
        );

        // Still able to talk natively: let the host's own mute run
        if host.has_perm(record.player_id, Permission::Talk)
            && !self.engine.is_escalated(record.player_id)
        {
            return false;
        }

        let notice = format!(
            "Chat slash commands for muted player \"{}\" have been disabled.",
            record.callsign
        );
        host.send_message(Source::Server, &Destination::Player(operator), &notice);
        true
    }
}

fn notify<H: Host + ?Sized>(host: &mut H, player: PlayerId, error: &CommandError) {
    host.send_message(Source::Server, &Destination::Player(player), &error.to_string());
}
