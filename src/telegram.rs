//! Telegram front end
//!
//! Long-polls the Bot API, turns channel posts and messages into
//! [`InboundMessage`]s for the relay, and answers operator commands.
//!
//! Uses explicit Dispatcher pattern for reliable message polling. Every update
//! shares one distribution key, so updates are handled strictly one at a time
//! in arrival order.

use anyhow::Result;
use std::sync::Arc;
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::{Chat, MessageOrigin, Update},
};

use crate::commands::{self, Command};
use crate::config::Config;
use crate::identity::ChatRef;
use crate::relay::{InboundMessage, Relay};

struct BotData {
    relay: Relay,
    admin_user_id: Option<u64>,
}

impl BotData {
    fn is_allowed(&self, user_id: Option<u64>) -> bool {
        commands::is_authorized(self.admin_user_id, user_id)
    }
}

/// Run Telegram bot with explicit Dispatcher for reliable polling
pub async fn run_telegram_bot(config: Config) -> Result<()> {
    let relay = Relay::from_config(&config);

    tracing::info!("===========================================");
    tracing::info!("  Signal Relay - Starting...");
    tracing::info!("===========================================");
    tracing::info!("API URL: {}", relay.forwarder().ingest_url());
    tracing::info!("Source channel: {}", config.source_label());
    tracing::info!("Ingest key: {}", config.masked_ingest_key());
    tracing::info!(
        "Commands: {}",
        match config.admin_user_id {
            Some(id) => format!("admin only ({})", id),
            None => "open to everyone".to_string(),
        }
    );

    let bot = Bot::new(config.bot_token.clone());

    // Verify bot token by calling getMe
    tracing::info!("Verifying bot token...");
    match bot.get_me().await {
        Ok(me) => {
            tracing::info!("Bot authenticated: @{} (ID: {})",
                me.username.as_deref().unwrap_or("unknown"),
                me.id
            );
        }
        Err(e) => {
            tracing::error!("Failed to authenticate bot: {}", e);
            anyhow::bail!("Bot authentication failed: {}", e);
        }
    }

    // Delete any existing webhook to ensure polling works
    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!("Failed to delete webhook: {} (continuing anyway)", e);
    }

    let handler_data = Arc::new(BotData {
        relay,
        admin_user_id: config.admin_user_id,
    });

    // Channel posts arrive as their own update kind
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(Update::filter_channel_post().endpoint(channel_post_handler));

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![handler_data])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd.kind);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in message handler"
        ))
        .distribution_function(|_| Some(()))
        .enable_ctrlc_handler()
        .build();

    #[cfg(unix)]
    {
        let token = dispatcher.shutdown_token();
        tokio::spawn(async move {
            let mut sigterm =
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::warn!("Cannot listen for SIGTERM: {}", e);
                        return;
                    }
                };
            sigterm.recv().await;
            tracing::info!("SIGTERM received, stopping dispatcher");
            if let Ok(stopped) = token.shutdown() {
                stopped.await;
            }
        });
    }

    tracing::info!("Starting dispatcher with long polling...");
    tracing::info!("  Bot is now LIVE - waiting for channel posts");

    dispatcher.dispatch().await;

    tracing::warn!("Dispatcher stopped");
    Ok(())
}

/// Where an update goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpdateSource {
    /// Private or group message
    Message,
    /// Post in a channel the bot administers
    ChannelPost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route<'a> {
    Command(&'a str),
    Relay(&'a str),
    Skip,
}

/// Decide how to treat an update's text.
///
/// Non-text updates are dropped uncounted. Slash text is a command only in
/// messages; channel posts are never answered, so they always go to the relay.
pub(crate) fn route(source: UpdateSource, text: Option<&str>) -> Route<'_> {
    match (source, text) {
        (_, None) => Route::Skip,
        (UpdateSource::Message, Some(t)) if t.starts_with('/') => Route::Command(t),
        (_, Some(t)) => Route::Relay(t),
    }
}

/// Message endpoint for the dispatcher
async fn message_handler(bot: Bot, msg: Message, data: Arc<BotData>) -> ResponseResult<()> {
    handle_update(&bot, &msg, &data, UpdateSource::Message).await
}

/// Channel-post endpoint for the dispatcher
async fn channel_post_handler(bot: Bot, msg: Message, data: Arc<BotData>) -> ResponseResult<()> {
    handle_update(&bot, &msg, &data, UpdateSource::ChannelPost).await
}

async fn handle_update(
    bot: &Bot,
    msg: &Message,
    data: &BotData,
    source: UpdateSource,
) -> ResponseResult<()> {
    match route(source, msg.text()) {
        Route::Skip => Ok(()),
        Route::Command(text) => handle_command(bot, msg, data, text).await,
        Route::Relay(text) => {
            let inbound = to_inbound(msg, text);
            let disposition = data.relay.handle(&inbound).await;
            tracing::debug!("chat={} -> {:?}", msg.chat.id.0, disposition);
            Ok(())
        }
    }
}

async fn handle_command(bot: &Bot, msg: &Message, data: &BotData, text: &str) -> ResponseResult<()> {
    let Some(cmd) = Command::parse(text) else {
        tracing::debug!("Unknown command: {:?}", text);
        return Ok(());
    };

    let user_id = msg.from.as_ref().map(|u| u.id.0);
    let chat_id = msg.chat.id;

    tracing::info!("Command {:?} from user={:?}, chat={}", cmd, user_id, chat_id.0);

    if !data.is_allowed(user_id) {
        tracing::warn!("Unauthorized command {:?} from user {:?}", cmd, user_id);
        bot.send_message(chat_id, commands::NOT_ALLOWED).await?;
        return Ok(());
    }

    let relay = &data.relay;
    match cmd {
        Command::Start => {
            bot.send_message(chat_id, commands::info_text(relay)).await?;
        }
        Command::Stats => {
            bot.send_message(chat_id, commands::stats_text(relay)).await?;
        }
        Command::Test => {
            bot.send_message(chat_id, commands::TEST_ACK).await?;
            let reply = commands::run_test(relay).await;
            bot.send_message(chat_id, reply).await?;
        }
        Command::Health => {
            bot.send_message(chat_id, commands::HEALTH_ACK).await?;
            let reply = commands::health_text(relay).await;
            bot.send_message(chat_id, reply).await?;
        }
        Command::ForwardOn => {
            bot.send_message(chat_id, commands::set_forwarding(relay, true)).await?;
        }
        Command::ForwardOff => {
            bot.send_message(chat_id, commands::set_forwarding(relay, false)).await?;
        }
        Command::ForwardStatus => {
            bot.send_message(chat_id, commands::forward_status_text(relay)).await?;
        }
    }

    Ok(())
}

fn chat_ref(chat: &Chat) -> ChatRef {
    ChatRef {
        id: chat.id.0,
        username: chat.username().map(str::to_string),
    }
}

/// Chat a forwarded message originally came from, if it was a chat at all
pub(crate) fn forward_origin_chat(origin: &MessageOrigin) -> Option<ChatRef> {
    match origin {
        MessageOrigin::Channel { chat, .. } => Some(chat_ref(chat)),
        MessageOrigin::Chat { sender_chat, .. } => Some(chat_ref(sender_chat)),
        _ => None,
    }
}

fn to_inbound(msg: &Message, text: &str) -> InboundMessage {
    InboundMessage {
        text: text.to_string(),
        chat: chat_ref(&msg.chat),
        forwarded_from: msg.forward_origin().and_then(forward_origin_chat),
    }
}
