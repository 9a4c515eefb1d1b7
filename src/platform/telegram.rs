use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId, ParseMode,
    ReplyParameters,
};
use tracing::{debug, error, info, warn};

use crate::bot::MessageHandler;
use crate::platform::{
    IncomingMessage, Messenger, OutgoingText, RepliedMessage, Sender, TextFormat, UrlButton,
};

/// [`Messenger`] backed by the Telegram Bot API
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

// Legacy Markdown is what the welcome text is written in.
#[allow(deprecated)]
fn parse_mode(format: TextFormat) -> Option<ParseMode> {
    match format {
        TextFormat::Plain => None,
        TextFormat::Markdown => Some(ParseMode::Markdown),
    }
}

fn keyboard(buttons: &[UrlButton]) -> Result<InlineKeyboardMarkup> {
    let row = buttons
        .iter()
        .map(|button| {
            let url = reqwest::Url::parse(&button.url)
                .with_context(|| format!("Invalid button URL: {}", button.url))?;
            Ok(InlineKeyboardButton::url(button.label.clone(), url))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(InlineKeyboardMarkup::new(vec![row]))
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: i64, message: OutgoingText) -> Result<i32> {
        let mut request = self.bot.send_message(ChatId(chat_id), message.text);
        if let Some(mode) = parse_mode(message.format) {
            request = request.parse_mode(mode);
        }
        if let Some(reply_to) = message.reply_to {
            request = request.reply_parameters(ReplyParameters::new(MessageId(reply_to)));
        }
        if !message.buttons.is_empty() {
            request = request.reply_markup(keyboard(&message.buttons)?);
        }

        let sent = request
            .await
            .with_context(|| format!("Telegram sendMessage to chat {} failed", chat_id))?;
        Ok(sent.id.0)
    }

    async fn send_document(&self, chat_id: i64, file_name: &str, contents: Vec<u8>) -> Result<()> {
        let file = InputFile::memory(contents).file_name(file_name.to_string());
        self.bot
            .send_document(ChatId(chat_id), file)
            .await
            .with_context(|| format!("Telegram sendDocument to chat {} failed", chat_id))?;
        Ok(())
    }

    async fn edit_text(&self, chat_id: i64, message_id: i32, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(ChatId(chat_id), MessageId(message_id), text)
            .await
            .with_context(|| format!("Telegram editMessageText in chat {} failed", chat_id))?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()> {
        self.bot
            .delete_message(ChatId(chat_id), MessageId(message_id))
            .await
            .with_context(|| format!("Telegram deleteMessage in chat {} failed", chat_id))?;
        Ok(())
    }
}

/// Convert a Telegram message. Messages without a sender or without text
/// (stickers, photos without a command) yield `None`.
fn to_incoming(msg: &Message) -> Option<IncomingMessage> {
    let user = msg.from.as_ref()?;
    let text = msg.text()?;

    Some(IncomingMessage {
        message_id: msg.id.0,
        chat_id: msg.chat.id.0,
        sender: Sender {
            id: user.id.0,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        },
        text: text.to_string(),
        reply_to: msg.reply_to_message().map(|reply| RepliedMessage {
            text: reply.text().map(str::to_string),
            caption: reply.caption().map(str::to_string),
        }),
    })
}

/// Long-poll Telegram and feed every text message to `handler`
pub async fn run(bot: Bot, handler: Arc<dyn MessageHandler>) -> Result<()> {
    info!("Starting Telegram platform...");

    let schema = Update::filter_message()
        .filter_map(|msg: Message| {
            let incoming = to_incoming(&msg);
            if incoming.is_none() {
                debug!("Skipping message {} without sender or text", msg.id.0);
            }
            incoming
        })
        .endpoint(handle_message);

    Dispatcher::builder(bot, schema)
        .dependencies(dptree::deps![handler])
        // Every update gets the same key, so they are handled one at a time.
        .distribution_function(|_: &Update| Some(()))
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(
    incoming: IncomingMessage,
    handler: Arc<dyn MessageHandler>,
) -> ResponseResult<()> {
    if let Err(e) = handler.handle(&incoming).await {
        error!(
            "Failed to handle message {} in chat {}: {:#}",
            incoming.message_id, incoming.chat_id, e
        );
    }
    Ok(())
}
