//! Signal Relay
//!
//! Listens to a Telegram channel and forwards trading-signal messages to a
//! website ingestion API.
//!
//! # Features
//!
//! - **Classifier**: recognises new signals, take-profit updates and stop-loss hits
//! - **Forwarder**: authenticated POST to `/api/signals/ingest`, tri-state replies
//! - **Source filter**: canonical channel identities, forwarded posts included
//! - **Commands**: /start, /stats, /test, /health, /forward_on|off|status
//!
//! # Architecture
//!
//! ```text
//! Telegram ──► Dispatcher ──► Relay ──► Forwarder ──► Ingestion API
//! (polling)    (1 worker)       │         (reqwest)
//!                               ├── Source filter (identity)
//!                               ├── Classifier (regex)
//!                               └── Stats (counters)
//! ```

pub mod classifier;
pub mod commands;
pub mod config;
pub mod forwarder;
pub mod identity;
pub mod relay;
pub mod stats;
pub mod telegram;

#[cfg(test)]
mod telegram_tests;

pub use classifier::{classify, is_signal_message, SignalKind};
pub use commands::Command;
pub use config::{Config, ConfigError};
pub use forwarder::{ForwardError, ForwardOutcome, Forwarder, HealthReport};
pub use identity::{canonical_chat_id, ChannelIdentity, ChatRef};
pub use relay::{Disposition, InboundMessage, Relay};
pub use stats::{RelayStats, StatsSnapshot};
