use crate::platform::{IncomingMessage, RepliedMessage};

/// Text of the replied-to message, falling back to its caption.
/// Empty when there is no reply or the reply has neither.
fn reply_text(reply: Option<&RepliedMessage>) -> &str {
    let Some(reply) = reply else {
        return "";
    };
    reply
        .text
        .as_deref()
        .filter(|text| !text.is_empty())
        .or(reply.caption.as_deref())
        .unwrap_or("")
}

/// Build the question sent to the model from a message and whatever it replies to.
///
/// With both parts present the result is `"{message}\n\n{reply}"`. With only one
/// present the two are joined without a separator.
pub fn compose_prompt(message: &IncomingMessage) -> String {
    let reply = reply_text(message.reply_to.as_ref());
    let current = message.text.as_str();

    if !reply.is_empty() && !current.is_empty() {
        format!("{}\n\n{}", current, reply)
    } else {
        format!("{}{}", reply, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::{message_from, replied, sender};

    fn message(text: &str, reply: Option<RepliedMessage>) -> IncomingMessage {
        IncomingMessage {
            reply_to: reply,
            ..message_from(sender(1, "Ann"), text)
        }
    }

    #[test]
    fn test_plain_message() {
        assert_eq!(compose_prompt(&message("Hello", None)), "Hello");
    }

    #[test]
    fn test_message_then_reply_text() {
        let msg = message("Summarize this", Some(replied(Some("Long article"), None)));
        assert_eq!(compose_prompt(&msg), "Summarize this\n\nLong article");
    }

    #[test]
    fn test_caption_used_when_reply_has_no_text() {
        let msg = message("What is this?", Some(replied(None, Some("A photo of a cat"))));
        assert_eq!(compose_prompt(&msg), "What is this?\n\nA photo of a cat");
    }

    #[test]
    fn test_reply_text_preferred_over_caption() {
        let msg = message("q", Some(replied(Some("text"), Some("caption"))));
        assert_eq!(compose_prompt(&msg), "q\n\ntext");
    }

    #[test]
    fn test_only_reply_text_has_no_separator() {
        let msg = message("", Some(replied(Some("quoted"), None)));
        assert_eq!(compose_prompt(&msg), "quoted");
    }

    #[test]
    fn test_reply_without_text_or_caption() {
        let msg = message("Hello", Some(replied(None, None)));
        assert_eq!(compose_prompt(&msg), "Hello");
    }

    #[test]
    fn test_everything_empty() {
        let msg = message("", Some(RepliedMessage::default()));
        assert_eq!(compose_prompt(&msg), "");
    }
}
