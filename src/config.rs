//! Configuration for the helper engine and the reference chat server

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Match durations (minutes) accepted by the match availability commands
pub const DEFAULT_MATCH_DURATIONS: [u32; 3] = [15, 20, 30];

/// Settings consumed by the helper itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Durations accepted by `/icanfm`, `/icanoffi` and `/icanmixedoffi`
    pub match_durations: Vec<u32>,
    /// Drop pending grants whose echo has not arrived after this many
    /// seconds. `None` keeps them until the player leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_grant_ttl_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_durations: DEFAULT_MATCH_DURATIONS.to_vec(),
            pending_grant_ttl_secs: None,
        }
    }
}

/// Reference chat server configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "muted-chat-server")]
#[command(about = "Reference chat host running the muted chat helper")]
#[command(version)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "MUTED_CHAT_BIND", default_value = "0.0.0.0:5154")]
    pub bind: SocketAddr,

    /// Interval between scheduling ticks in milliseconds
    #[arg(long, env = "MUTED_CHAT_TICK_MS", default_value_t = 100)]
    pub tick_interval_ms: u64,

    /// Callsigns granted the MUTE permission on join
    #[arg(long, env = "MUTED_CHAT_OPERATORS", value_delimiter = ',')]
    pub operators: Vec<String>,

    /// Callsigns that join without TALK and PRIVATEMESSAGE
    #[arg(long, env = "MUTED_CHAT_MUTED", value_delimiter = ',')]
    pub muted: Vec<String>,

    /// Accepted match durations in minutes
    #[arg(
        long,
        env = "MUTED_CHAT_MATCH_DURATIONS",
        value_delimiter = ',',
        default_value = "15,20,30"
    )]
    pub match_durations: Vec<u32>,

    /// Expire pending grants after this many seconds (unset: never)
    #[arg(long, env = "MUTED_CHAT_PENDING_TTL_SECS")]
    pub pending_grant_ttl_secs: Option<u64>,
}

impl ServerConfig {
    /// The subset of settings handed to the helper
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            match_durations: self.match_durations.clone(),
            pending_grant_ttl_secs: self.pending_grant_ttl_secs,
        }
    }

    /// Join policy derived from the operator and muted lists
    pub fn join_policy(&self) -> JoinPolicy {
        JoinPolicy {
            operators: self.operators.iter().map(|c| c.to_lowercase()).collect(),
            muted: self.muted.iter().map(|c| c.to_lowercase()).collect(),
        }
    }
}

/// Decides which permissions a player gets on join, by callsign
#[derive(Debug, Clone, Default)]
pub struct JoinPolicy {
    operators: Vec<String>,
    muted: Vec<String>,
}

impl JoinPolicy {
    pub fn new(operators: &[&str], muted: &[&str]) -> Self {
        Self {
            operators: operators.iter().map(|c| c.to_lowercase()).collect(),
            muted: muted.iter().map(|c| c.to_lowercase()).collect(),
        }
    }

    pub fn is_operator(&self, callsign: &str) -> bool {
        let callsign = callsign.to_lowercase();
        self.operators.contains(&callsign)
    }

    pub fn is_muted(&self, callsign: &str) -> bool {
        let callsign = callsign.to_lowercase();
        self.muted.contains(&callsign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.match_durations, vec![15, 20, 30]);
        assert_eq!(config.pending_grant_ttl_secs, None);
    }

    #[test]
    fn test_engine_config_deserialize_without_ttl() {
        let config: EngineConfig = serde_json::from_str(r#"{"match_durations":[10]}"#).unwrap();
        assert_eq!(config.match_durations, vec![10]);
        assert!(config.pending_grant_ttl_secs.is_none());
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::parse_from(["muted-chat-server"]);
        assert_eq!(config.bind.port(), 5154);
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.match_durations, vec![15, 20, 30]);
        assert!(config.operators.is_empty());
        assert_eq!(config.engine(), EngineConfig::default());
    }

    #[test]
    fn test_server_config_lists() {
        let config = ServerConfig::parse_from([
            "muted-chat-server",
            "--operators",
            "Admin,Ref",
            "--muted",
            "Spammer",
            "--pending-grant-ttl-secs",
            "30",
        ]);
        let policy = config.join_policy();
        assert!(policy.is_operator("admin"));
        assert!(policy.is_operator("REF"));
        assert!(policy.is_muted("spammer"));
        assert!(!policy.is_muted("admin"));
        assert_eq!(config.engine().pending_grant_ttl_secs, Some(30));
    }
}
