use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{error, info};

use crate::config::Config;
use crate::dispatch;
use crate::llm::TextGenerator;
use crate::owner::{with_owner_notifications, OwnerNotifier};
use crate::platform::{IncomingMessage, Messenger, OutgoingText, Sender, UrlButton};
use crate::prompt::compose_prompt;

pub const PLACEHOLDER_TEXT: &str = "Silahkan tunggu...";
pub const REPOSITORY_URL: &str = "https://github.com/V1HyperBot/chatbot";
pub const CREDIT_URL: &str = "https://t.me/NorSodikin";

/// Something that reacts to one incoming message.
/// Middleware such as [`OwnerNotifier`] wraps one handler in another.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: &IncomingMessage) -> Result<()>;
}

#[async_trait]
impl<H: MessageHandler + ?Sized> MessageHandler for Arc<H> {
    async fn handle(&self, message: &IncomingMessage) -> Result<()> {
        (**self).handle(message).await
    }
}

/// What to do with a message, decided from its text alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Greeting,
    Query,
}

impl Route {
    pub fn of(text: &str) -> Self {
        if text.starts_with("/start") {
            Route::Greeting
        } else {
            Route::Query
        }
    }
}

/// Markdown link that mentions the user by name.
/// Link text is taken literally up to the first `]`, so that is the only
/// character removed from the name.
pub fn mention(sender: &Sender) -> String {
    let name = match sender.last_name.as_deref() {
        Some(last) if !last.is_empty() => format!("{} {}", sender.first_name, last),
        _ => sender.first_name.clone(),
    };
    format!("[{}](tg://user?id={})", name.replace(']', ""), sender.id)
}

fn welcome_message(sender: &Sender) -> OutgoingText {
    OutgoingText::markdown(format!(
        "**👋 Hai {} Perkenalkan saya ai google telegram bot. Dan saya adalah robot kecerdasan buatan dari ai.google.dev, dan saya siap menjawab pertanyaan yang Anda berikan**",
        mention(sender)
    ))
    .with_buttons(vec![
        UrlButton::new("Repository", REPOSITORY_URL),
        UrlButton::new("Credit", CREDIT_URL),
    ])
}

/// Greets on `/start`, otherwise relays the message to the model and
/// sends the answer back.
pub struct Relay {
    messenger: Arc<dyn Messenger>,
    generator: Arc<dyn TextGenerator>,
}

impl Relay {
    pub fn new(messenger: Arc<dyn Messenger>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            messenger,
            generator,
        }
    }

    async fn greet(&self, message: &IncomingMessage) -> Result<()> {
        self.messenger
            .send_text(message.chat_id, welcome_message(&message.sender))
            .await
            .context("Failed to send welcome message")?;
        Ok(())
    }

    async fn answer(&self, message: &IncomingMessage) -> Result<()> {
        let placeholder = self
            .messenger
            .send_text(
                message.chat_id,
                OutgoingText::plain(PLACEHOLDER_TEXT).replying_to(message.message_id),
            )
            .await
            .context("Failed to send placeholder message")?;

        if let Err(e) = self.generate_and_deliver(message, placeholder).await {
            error!("Error processing message: {:#}", e);
            self.messenger
                .edit_text(message.chat_id, placeholder, &format!("{:#}", e))
                .await
                .context("Failed to report error in placeholder message")?;
        }

        Ok(())
    }

    async fn generate_and_deliver(&self, message: &IncomingMessage, placeholder: i32) -> Result<()> {
        let prompt = compose_prompt(message);
        let output = self.generator.generate(&prompt).await?;
        dispatch::deliver(self.messenger.as_ref(), message.chat_id, &output, placeholder).await
    }
}

#[async_trait]
impl MessageHandler for Relay {
    async fn handle(&self, message: &IncomingMessage) -> Result<()> {
        info!(
            "Message from {} ({}): {}",
            message.sender.first_name, message.sender.id, message.text
        );

        match Route::of(&message.text) {
            Route::Greeting => self.greet(message).await,
            Route::Query => self.answer(message).await,
        }
    }
}

/// The full handler stack: the relay behind the owner notifier
pub fn build_handler(
    config: &Config,
    messenger: Arc<dyn Messenger>,
    generator: Arc<dyn TextGenerator>,
) -> OwnerNotifier<Relay> {
    let relay = Relay::new(messenger.clone(), generator);
    with_owner_notifications(relay, config.owner_id, messenger)
}
