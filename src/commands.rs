//! Whitelisted chat commands
//!
//! The fixed vocabulary a chat-restricted player may still use. Each command
//! renders to exactly one phrase, which the escalation engine then sends.

use crate::error::CommandError;

/// The operator command that disables whitelist phrases for a player
pub const MUTE_COMMAND: &str = "mute";

/// Every command name registered with the host, including aliases
pub const COMMAND_NAMES: [&str; 17] = [
    MUTE_COMMAND,
    "icanfm",
    "icanfunmatch",
    "icanoffi",
    "icanofficial",
    "icanmixedoffi",
    "icanmixedofficial",
    "icantmatch",
    "icannotmatch",
    "ours",
    "theirs",
    "atk",
    "attack",
    "def",
    "defend",
    "mid",
    "middle",
];

/// Help shown on join to players who cannot chat
pub const HELP_LINES: [&str; 13] = [
    " ",
    "You are not permitted to chat due to being muted. However, you may use the following",
    "slash commands to send specific game-related messages:",
    " ",
    "/icanfm [duration]         -  I can play a [duration] fun match",
    "/icanoffi [duration]       -  I can play a [duration] official match",
    "/icanmixedoffi [duration]  -  I can play a [duration] mixed official match",
    "/icantmatch                -  I cannot match right now",
    "/ours                      -  Ours!",
    "/theirs                    -  Theirs!",
    "/atk                       -  Attack!",
    "/def                       -  Defend!",
    "/mid                       -  Mid!",
];

/// Kind of match a player announces availability for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Fun,
    Official,
    MixedOfficial,
}

impl MatchKind {
    fn label(&self) -> &'static str {
        match self {
            MatchKind::Fun => "fun match",
            MatchKind::Official => "official match",
            MatchKind::MixedOfficial => "mixed official match",
        }
    }

    fn article(&self) -> &'static str {
        match self {
            MatchKind::Official => "an",
            MatchKind::Fun | MatchKind::MixedOfficial => "a",
        }
    }
}

/// A whitelisted phrase command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitelistCommand {
    /// `/icanfm`, `/icanoffi`, `/icanmixedoffi` with an optional duration
    CanMatch(MatchKind),
    CannotMatch,
    Ours,
    Theirs,
    Attack,
    Defend,
    Mid,
}

impl WhitelistCommand {
    /// Resolve a command name (or alias), case-insensitively.
    /// `mute` is not a whitelist command and resolves to `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let command = match name.to_ascii_lowercase().as_str() {
            "icanfm" | "icanfunmatch" => WhitelistCommand::CanMatch(MatchKind::Fun),
            "icanoffi" | "icanofficial" => WhitelistCommand::CanMatch(MatchKind::Official),
            "icanmixedoffi" | "icanmixedofficial" => {
                WhitelistCommand::CanMatch(MatchKind::MixedOfficial)
            }
            "icantmatch" | "icannotmatch" => WhitelistCommand::CannotMatch,
            "ours" => WhitelistCommand::Ours,
            "theirs" => WhitelistCommand::Theirs,
            "atk" | "attack" => WhitelistCommand::Attack,
            "def" | "defend" => WhitelistCommand::Defend,
            "mid" | "middle" => WhitelistCommand::Mid,
            _ => return None,
        };
        Some(command)
    }

    /// Render the phrase this command sends.
    ///
    /// Match commands accept zero or one parameter; the duration must be one
    /// of `durations`. All other commands take no parameters.
    pub fn phrase(&self, params: &[String], durations: &[u32]) -> Result<String, CommandError> {
        match self {
            WhitelistCommand::CanMatch(kind) => match params {
                [] => Ok(format!("I can play {} {}", kind.article(), kind.label())),
                [duration] => {
                    let minutes = parse_duration(duration, durations)?;
                    Ok(format!("I can play a {}-minute {}", minutes, kind.label()))
                }
                _ => Err(CommandError::IncorrectParameters),
            },
            fixed => {
                if !params.is_empty() {
                    return Err(CommandError::IncorrectParameters);
                }
                Ok(fixed.fixed_phrase().to_string())
            }
        }
    }

    fn fixed_phrase(&self) -> &'static str {
        match self {
            WhitelistCommand::CanMatch(_) => "",
            WhitelistCommand::CannotMatch => "I cannot match right now",
            WhitelistCommand::Ours => "Ours!",
            WhitelistCommand::Theirs => "Theirs!",
            WhitelistCommand::Attack => "Attack!",
            WhitelistCommand::Defend => "Defend!",
            WhitelistCommand::Mid => "Mid!",
        }
    }
}

/// Reads the leading number of `raw`, so `"20min"` is 20 minutes
fn parse_duration(raw: &str, durations: &[u32]) -> Result<u32, CommandError> {
    let raw = raw.trim_start();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let minutes: u32 = raw[..end]
        .parse()
        .map_err(|_| CommandError::IncorrectDuration)?;

    if durations.contains(&minutes) {
        Ok(minutes)
    } else {
        Err(CommandError::IncorrectDuration)
    }
}
