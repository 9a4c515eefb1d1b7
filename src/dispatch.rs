use anyhow::{Context, Result};
use tracing::debug;

use crate::platform::{Messenger, OutgoingText};

/// Longest answer sent inline. Telegram caps messages at 4096 characters.
pub const MAX_INLINE_CHARS: usize = 4000;

/// File name used when the answer is too long for a message
pub const RESULT_FILE_NAME: &str = "result.txt";

/// Deliver `output` to `chat_id`, then remove the "please wait" placeholder.
///
/// Answers up to [`MAX_INLINE_CHARS`] characters go out as plain text, longer
/// ones as a `result.txt` document.
pub async fn deliver(
    messenger: &dyn Messenger,
    chat_id: i64,
    output: &str,
    placeholder_id: i32,
) -> Result<()> {
    let chars = output.chars().count();

    if chars <= MAX_INLINE_CHARS {
        debug!("Sending {} char answer inline to chat {}", chars, chat_id);
        messenger
            .send_text(chat_id, OutgoingText::plain(output))
            .await
            .context("Failed to send answer")?;
    } else {
        debug!("Sending {} char answer as {} to chat {}", chars, RESULT_FILE_NAME, chat_id);
        messenger
            .send_document(chat_id, RESULT_FILE_NAME, output.as_bytes().to_vec())
            .await
            .context("Failed to send answer document")?;
    }

    messenger
        .delete_message(chat_id, placeholder_id)
        .await
        .context("Failed to delete placeholder message")?;

    Ok(())
}
