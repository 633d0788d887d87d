//! Operator commands
//!
//! Parsing and reply text for the bot's slash commands. Sending is left to the
//! Telegram front end so the replies can be checked without a bot.

use crate::forwarder::ForwardOutcome;
use crate::relay::Relay;

/// Example signal sent by `/test`
pub const TEST_SIGNAL: &str = "script          : BTCUSD
Position        : BUY ⬆️
Enter Price     : 90827.56
Take Profit 1   : 91528.57
Take Profit 2   : 91995.90
Take Profit 3   : 92696.91
Take Profit 4   : 93631.58
Stoploss        : 89659.22";

pub const TEST_ACK: &str = "🧪 Sending test signal...";
pub const HEALTH_ACK: &str = "🔍 Checking API connection...";
pub const NOT_ALLOWED: &str = "🚫 You are not allowed to use this command.";

/// Supported commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stats,
    Test,
    Health,
    ForwardOn,
    ForwardOff,
    ForwardStatus,
}

impl Command {
    /// Parse `/cmd`, `/cmd@BotName` or `/cmd args`; None for anything else
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.trim().split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name.to_ascii_lowercase().as_str() {
            "start" | "info" => Some(Self::Start),
            "stats" => Some(Self::Stats),
            "test" => Some(Self::Test),
            "health" => Some(Self::Health),
            "forward_on" => Some(Self::ForwardOn),
            "forward_off" => Some(Self::ForwardOff),
            "forward_status" => Some(Self::ForwardStatus),
            _ => None,
        }
    }
}

/// Command access check: open to everyone unless an admin is configured
pub fn is_authorized(admin_user_id: Option<u64>, user_id: Option<u64>) -> bool {
    match admin_user_id {
        None => true,
        Some(admin) => user_id == Some(admin),
    }
}

fn source_label(relay: &Relay) -> String {
    relay
        .source()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Any".to_string())
}

/// `/start`: description plus live counters
pub fn info_text(relay: &Relay) -> String {
    let stats = relay.stats();
    format!(
        "🤖 Signal Relay Bot\n\n\
        I forward trading signals to the website.\n\n\
        📊 Current Stats:\n\
        • Messages received: {}\n\
        • Signals forwarded: {}\n\
        • Messages ignored: {}\n\
        • Errors: {}\n\n\
        📡 API: {}\n\
        📺 Source: {}\n\n\
        Use /stats for statistics\n\
        Use /test to send a test signal",
        stats.received,
        stats.forwarded,
        stats.ignored,
        stats.errors,
        relay.forwarder().base_url(),
        source_label(relay),
    )
}

/// `/stats`: counters and the forwarding endpoint
pub fn stats_text(relay: &Relay) -> String {
    let stats = relay.stats();
    format!(
        "📊 Bot Statistics\n\n\
        Messages received: {}\n\
        Signals forwarded: {}\n\
        Messages ignored: {}\n\
        Errors: {}\n\n\
        Running since: {}\n\
        API URL: {}",
        stats.received,
        stats.forwarded,
        stats.ignored,
        stats.errors,
        stats.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        relay.forwarder().ingest_url(),
    )
}

/// `/test` result line
pub fn test_result_text(outcome: &ForwardOutcome) -> String {
    if outcome.is_forwarded() {
        "✅ Test signal forwarded successfully!".to_string()
    } else {
        format!("❌ Test failed: {}", outcome.label())
    }
}

/// `/test`: forward the example signal; counters are left alone
pub async fn run_test(relay: &Relay) -> String {
    let outcome = relay.forwarder().forward(TEST_SIGNAL).await;
    test_result_text(&outcome)
}

/// `/health`: probe the downstream API
pub async fn health_text(relay: &Relay) -> String {
    match relay.forwarder().health().await {
        Ok(report) if report.is_healthy() => format!(
            "✅ API is healthy!\n\n\
            Status: {}\n\
            Database: {}",
            report.status.as_deref().unwrap_or("unknown"),
            report.database.as_deref().unwrap_or("unknown"),
        ),
        Ok(report) => format!("⚠️ API returned: {}", report.http_status),
        Err(e) => format!("❌ Cannot reach API: {}", e),
    }
}

pub fn forward_status_text(relay: &Relay) -> String {
    let status = if relay.is_enabled() { "🟢 ON" } else { "🔴 OFF" };
    format!("Forwarding is {}", status)
}

/// `/forward_on` and `/forward_off`
pub fn set_forwarding(relay: &Relay, enabled: bool) -> String {
    relay.set_enabled(enabled);
    if enabled {
        "🟢 Forwarding enabled".to_string()
    } else {
        "🔴 Forwarding disabled".to_string()
    }
}
