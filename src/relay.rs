//! Message relay
//!
//! Filters inbound channel messages by origin, classifies them and forwards
//! matches to the ingestion API. Each event runs to completion (including the
//! HTTP call) before the caller hands over the next one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};

use crate::classifier;
use crate::config::Config;
use crate::forwarder::{ForwardOutcome, Forwarder};
use crate::identity::{ChannelIdentity, ChatRef};
use crate::stats::{RelayStats, StatsSnapshot};

/// Emit a summary line every this many received messages
const SUMMARY_EVERY: u64 = 10;

/// A text message as seen by the relay
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub text: String,
    /// Chat the message was posted in
    pub chat: ChatRef,
    /// Original channel when the message was forwarded from elsewhere
    pub forwarded_from: Option<ChatRef>,
}

impl InboundMessage {
    pub fn new(text: impl Into<String>, chat: ChatRef) -> Self {
        Self {
            text: text.into(),
            chat,
            forwarded_from: None,
        }
    }

    pub fn forwarded(mut self, origin: ChatRef) -> Self {
        self.forwarded_from = Some(origin);
        self
    }
}

/// What the relay did with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Forwarding switched off; nothing counted
    Paused,
    /// Not from the source channel; nothing counted
    OutsideSource,
    /// Did not look like a signal
    NotSignal,
    /// Accepted by the ingestion API
    Forwarded,
    /// Sent, but the API declined it
    IgnoredDownstream,
    /// Sent, but the request or response failed
    Failed,
}

/// Channel-to-API relay
pub struct Relay {
    source: Option<ChannelIdentity>,
    forwarder: Forwarder,
    stats: RelayStats,
    enabled: AtomicBool,
    summaries: AtomicU64,
}

impl Relay {
    pub fn new(source: Option<ChannelIdentity>, forwarder: Forwarder) -> Self {
        Self {
            source,
            forwarder,
            stats: RelayStats::new(),
            enabled: AtomicBool::new(true),
            summaries: AtomicU64::new(0),
        }
    }

    /// Create from config
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.source_channel.clone(), Forwarder::from_config(config))
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    pub fn source(&self) -> Option<&ChannelIdentity> {
        self.source.as_ref()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of periodic summary lines logged so far
    pub fn summaries_logged(&self) -> u64 {
        self.summaries.load(Ordering::Relaxed)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        info!("Forwarding {}", if enabled { "enabled" } else { "disabled" });
    }

    /// True when the message (or the channel it was forwarded from) is the source
    pub fn is_from_source(&self, msg: &InboundMessage) -> bool {
        match &self.source {
            None => true,
            Some(source) => {
                source.matches(&msg.chat)
                    || msg
                        .forwarded_from
                        .as_ref()
                        .map(|origin| source.matches(origin))
                        .unwrap_or(false)
            }
        }
    }

    /// Handle one inbound message
    pub async fn handle(&self, msg: &InboundMessage) -> Disposition {
        if !self.is_enabled() {
            return Disposition::Paused;
        }

        if !self.is_from_source(msg) {
            debug!("Dropping message from chat {} (not the source channel)", msg.chat.id);
            return Disposition::OutsideSource;
        }

        let received = self.stats.record_received();
        let text = msg.text.trim();

        let disposition = match classifier::classify(text) {
            None => {
                self.stats.record_ignored();
                info!("Ignoring message ({} chars): not a signal", text.len());
                Disposition::NotSignal
            }
            Some(kind) => {
                info!("Forwarding {} message ({} chars)", kind.as_str(), text.len());
                match self.forwarder.forward(text).await {
                    ForwardOutcome::Forwarded { .. } => {
                        self.stats.record_forwarded();
                        Disposition::Forwarded
                    }
                    ForwardOutcome::Ignored => {
                        self.stats.record_ignored();
                        Disposition::IgnoredDownstream
                    }
                    ForwardOutcome::Failed(_) => {
                        self.stats.record_error();
                        Disposition::Failed
                    }
                }
            }
        };

        if received % SUMMARY_EVERY == 0 {
            self.summaries.fetch_add(1, Ordering::Relaxed);
            info!("Stats: {}", self.stats.snapshot());
        }

        disposition
    }
}
