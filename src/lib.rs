//! Muted chat helper - lets chat-restricted players send whitelisted phrases
//!
//! A player without chat permissions is escalated for exactly one
//! whitelisted message, which is matched on the raw chat stream and then
//! revoked on the next scheduling tick.

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod models;
pub mod plugin;
pub mod server;

pub use engine::{EscalationEngine, Reconciliation};
pub use host::{Host, Permission};
pub use models::{Destination, PlayerId, Source};
pub use plugin::MutedChatHelper;
pub use server::AppState;
