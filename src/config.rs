//! Configuration management
//!
//! Everything is read once from the process environment at startup
//! (`.env` is loaded by the binary before this runs).

use crate::identity::ChannelIdentity;

/// Default ingestion API base URL (local development server)
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Placeholder ingest key used when `INGEST_API_KEY` is not set
pub const DEFAULT_INGEST_KEY: &str = "change-me";

/// Configuration errors that prevent startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TELEGRAM_BOT_TOKEN is required (get one from @BotFather)")]
    MissingBotToken,

    #[error("ADMIN_TELEGRAM_USER_ID must be a numeric Telegram user id, got {0:?}")]
    InvalidAdminId(String),
}

/// Relay configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token
    pub bot_token: String,

    /// Only relay messages originating from this channel (None = any chat)
    pub source_channel: Option<ChannelIdentity>,

    /// Base URL of the ingestion API
    pub api_url: String,

    /// Bearer credential for the ingestion API
    pub ingest_api_key: String,

    /// Restrict operator commands to this Telegram user (None = open)
    pub admin_user_id: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bot_token = get("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::MissingBotToken)?;

        let source_channel = get("TELEGRAM_SOURCE_CHANNEL_ID")
            .map(|raw| ChannelIdentity::parse(&raw));

        let api_url = get("WEBSITE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let ingest_api_key =
            get("INGEST_API_KEY").unwrap_or_else(|| DEFAULT_INGEST_KEY.to_string());

        let admin_user_id = match get("ADMIN_TELEGRAM_USER_ID") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .map_err(|_| ConfigError::InvalidAdminId(raw.clone()))?,
            ),
            None => None,
        };

        Ok(Self {
            bot_token,
            source_channel,
            api_url,
            ingest_api_key,
            admin_user_id,
        })
    }

    /// Ingest key with everything past the first 8 characters hidden
    pub fn masked_ingest_key(&self) -> String {
        let visible: String = self.ingest_api_key.chars().take(8).collect();
        format!("{}...", visible)
    }

    /// Human-readable source channel for banners and replies
    pub fn source_label(&self) -> String {
        self.source_channel
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "Any".to_string())
    }
}
