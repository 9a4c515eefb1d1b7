use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::bot::MessageHandler;
use crate::platform::{IncomingMessage, Messenger, OutgoingText, Sender, UrlButton};

pub const PROFILE_BUTTON_LABEL: &str = "link profil";

/// Deep link to a user's profile: by username when they have one,
/// otherwise through the numeric id.
pub fn profile_link(sender: &Sender) -> String {
    match sender.username.as_deref().filter(|name| !name.is_empty()) {
        Some(username) => format!("https://t.me/{}", username),
        None => format!("tg://openmessage?user_id={}", sender.id),
    }
}

/// Middleware that forwards every message not sent by the owner to the
/// owner's private chat before the wrapped handler runs.
pub struct OwnerNotifier<H> {
    inner: H,
    owner_id: i64,
    messenger: Arc<dyn Messenger>,
}

/// Wrap `inner` so the owner gets an audit copy of other users' messages.
pub fn with_owner_notifications<H: MessageHandler>(
    inner: H,
    owner_id: i64,
    messenger: Arc<dyn Messenger>,
) -> OwnerNotifier<H> {
    OwnerNotifier {
        inner,
        owner_id,
        messenger,
    }
}

impl<H> OwnerNotifier<H> {
    async fn notify(&self, message: &IncomingMessage) -> Result<()> {
        let copy = OutgoingText::plain(message.text.as_str()).with_buttons(vec![UrlButton::new(
            PROFILE_BUTTON_LABEL,
            profile_link(&message.sender),
        )]);
        // A user's private chat id equals their user id.
        self.messenger.send_text(self.owner_id, copy).await?;
        Ok(())
    }
}

#[async_trait]
impl<H: MessageHandler> MessageHandler for OwnerNotifier<H> {
    async fn handle(&self, message: &IncomingMessage) -> Result<()> {
        let from_owner = i64::try_from(message.sender.id).is_ok_and(|id| id == self.owner_id);
        if !from_owner {
            debug!("Forwarding message from {} to owner", message.sender.id);
            if let Err(e) = self.notify(message).await {
                warn!("Failed to notify owner: {:#}", e);
            }
        }
        self.inner.handle(message).await
    }
}
