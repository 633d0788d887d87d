//! Chat identity canonicalization
//!
//! Telegram hands out the same channel under two spellings: the Bot API id
//! `-100<peer>` and the bare `<peer>` printed by MTProto clients. Public chats
//! also have an `@username`. The canonical form is the Bot API id, which is
//! what every observed chat already carries, so [`ChannelIdentity::parse`]
//! brings the configured value into that form and matching is exact equality.
//! Private chats (positive ids) and basic groups (`-<peer>`) never compare
//! equal to a channel.

use std::fmt;

/// Offset the Bot API adds to channel and supergroup peer ids (`-100…`)
const CHANNEL_ID_OFFSET: i64 = 1_000_000_000_000;

/// Bring a configured channel id into Bot API form.
///
/// A bare peer id `3232273065` becomes `-1003232273065`; ids that are
/// already negative (`-100…` channels, `-…` basic groups) are kept as-is.
pub fn canonical_chat_id(raw: i64) -> i64 {
    if raw > 0 {
        -CHANNEL_ID_OFFSET.saturating_add(raw)
    } else {
        raw
    }
}

/// A chat as observed on an inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRef {
    /// Bot API chat id
    pub id: i64,
    /// Public username, without `@`
    pub username: Option<String>,
}

impl ChatRef {
    pub fn new(id: i64) -> Self {
        Self { id, username: None }
    }

    pub fn with_username(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: Some(username.into()),
        }
    }
}

/// Canonical form of a configured source channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelIdentity {
    /// Bot API chat id
    Id(i64),
    /// Lowercased username without `@`
    Username(String),
}

impl ChannelIdentity {
    /// Parse a configured identity.
    ///
    /// Anything that is not an integer is taken as a username.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(id) => Self::Id(canonical_chat_id(id)),
            Err(_) => Self::Username(trimmed.trim_start_matches('@').to_ascii_lowercase()),
        }
    }

    /// Does the observed chat refer to this identity?
    pub fn matches(&self, chat: &ChatRef) -> bool {
        match self {
            Self::Id(id) => chat.id == *id,
            Self::Username(name) => chat
                .username
                .as_deref()
                .map(|u| u.trim_start_matches('@').eq_ignore_ascii_case(name))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for ChannelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Username(name) => write!(f, "@{}", name),
        }
    }
}
