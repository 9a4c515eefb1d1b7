pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// Who sent an incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: u64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// The message an incoming message replies to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepliedMessage {
    pub text: Option<String>,
    pub caption: Option<String>,
}

/// A message received from the chat platform.
/// Lives only for the duration of one handler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub message_id: i32,
    pub chat_id: i64,
    pub sender: Sender,
    pub text: String,
    pub reply_to: Option<RepliedMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    /// Sent verbatim, no markup interpretation
    #[default]
    Plain,
    /// Telegram legacy Markdown (`*bold*`, `[text](url)`)
    Markdown,
}

/// An inline button that opens a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlButton {
    pub label: String,
    pub url: String,
}

impl UrlButton {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// A text message to send, with optional formatting, reply target and buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingText {
    pub text: String,
    pub format: TextFormat,
    pub reply_to: Option<i32>,
    /// Rendered as a single keyboard row
    pub buttons: Vec<UrlButton>,
}

impl OutgoingText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            reply_to: None,
            buttons: Vec::new(),
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::Markdown,
            ..Self::plain(text)
        }
    }

    pub fn replying_to(mut self, message_id: i32) -> Self {
        self.reply_to = Some(message_id);
        self
    }

    pub fn with_buttons(mut self, buttons: Vec<UrlButton>) -> Self {
        self.buttons = buttons;
        self
    }
}

/// Outbound operations the relay needs from the chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message, returning the id of the sent message
    async fn send_text(&self, chat_id: i64, message: OutgoingText) -> Result<i32>;

    /// Upload `contents` as a document attachment named `file_name`
    async fn send_document(&self, chat_id: i64, file_name: &str, contents: Vec<u8>) -> Result<()>;

    async fn edit_text(&self, chat_id: i64, message_id: i32, text: &str) -> Result<()>;

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()>;
}
