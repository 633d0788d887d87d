//! Tests for Telegram front end helpers
//!
//! Unit tests for forward-origin extraction and update routing.

#[cfg(test)]
mod tests {
    // Forwarded message origins, deserialized from Bot API JSON
    mod forward_origin {
        use crate::identity::{ChannelIdentity, ChatRef};
        use crate::telegram::forward_origin_chat;
        use teloxide::types::MessageOrigin;

        fn origin(json: serde_json::Value) -> MessageOrigin {
            serde_json::from_value(json).expect("valid MessageOrigin")
        }

        #[test]
        fn test_channel_origin_yields_chat() {
            let origin = origin(serde_json::json!({
                "type": "channel",
                "chat": {
                    "id": -1003232273065i64,
                    "type": "channel",
                    "title": "Freya Trades",
                    "username": "freyasignals"
                },
                "message_id": 10,
                "date": 1700000000
            }));

            let chat = forward_origin_chat(&origin).expect("channel origin has a chat");
            assert_eq!(chat, ChatRef::with_username(-1003232273065, "freyasignals"));
            assert!(ChannelIdentity::parse("3232273065").matches(&chat));
            assert!(ChannelIdentity::parse("@FreyaSignals").matches(&chat));
        }

        #[test]
        fn test_hidden_user_origin_has_no_chat() {
            let origin = origin(serde_json::json!({
                "type": "hidden_user",
                "sender_user_name": "someone",
                "date": 1700000000
            }));
            assert!(forward_origin_chat(&origin).is_none());
        }
    }

    // Update routing: commands, relay, or nothing
    mod routing {
        use crate::classifier;
        use crate::commands::is_authorized;
        use crate::telegram::{route, Route, UpdateSource};

        const SIGNAL: &str = "script : BTCUSD\nPosition : BUY\nEnter Price : 90827.56\nTake Profit 1 : 91528.57\nStoploss : 89659.22";

        #[test]
        fn test_slash_message_is_a_command() {
            assert_eq!(route(UpdateSource::Message, Some("/stats")), Route::Command("/stats"));
            assert_eq!(route(UpdateSource::Message, Some("/unknown")), Route::Command("/unknown"));
        }

        #[test]
        fn test_plain_message_goes_to_relay() {
            assert_eq!(route(UpdateSource::Message, Some(SIGNAL)), Route::Relay(SIGNAL));
            assert_eq!(route(UpdateSource::Message, Some("gm")), Route::Relay("gm"));
        }

        #[test]
        fn test_non_text_is_skipped() {
            assert_eq!(route(UpdateSource::Message, None), Route::Skip);
            assert_eq!(route(UpdateSource::ChannelPost, None), Route::Skip);
        }

        #[test]
        fn test_channel_post_slash_text_is_never_a_command() {
            // Replying here would post into the source channel
            assert_eq!(route(UpdateSource::ChannelPost, Some("/test")), Route::Relay("/test"));
            assert!(!classifier::is_signal_message("/test"));
        }

        #[test]
        fn test_channel_post_signal_goes_to_relay() {
            assert_eq!(route(UpdateSource::ChannelPost, Some(SIGNAL)), Route::Relay(SIGNAL));
        }

        #[test]
        fn test_admin_gate() {
            assert!(is_authorized(None, None));
            assert!(is_authorized(Some(12345), Some(12345)));
            assert!(!is_authorized(Some(12345), Some(67890)));
        }
    }
}
