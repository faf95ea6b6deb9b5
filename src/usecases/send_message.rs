//! Use case for sending a message from the current user.
//!
//! Validation happens here, before the store is touched: text is trimmed,
//! media needs both a kind and a reference, and a message must carry
//! text or media.

use crate::domain::{
    conversation::ConversationId,
    error::ChatError,
    message::{MediaKind, MessageId, NewMessage},
};

/// Command to send a message to a specific conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageCommand {
    pub conversation_id: ConversationId,
    pub text: String,
    pub media_ref: Option<String>,
    pub media_kind: MediaKind,
    pub reply_to: Option<MessageId>,
}

impl SendMessageCommand {
    pub fn text(conversation_id: impl Into<ConversationId>, text: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            text: text.into(),
            media_ref: None,
            media_kind: MediaKind::None,
            reply_to: None,
        }
    }

    pub fn with_media(mut self, kind: MediaKind, media_ref: impl Into<String>) -> Self {
        self.media_kind = kind;
        self.media_ref = Some(media_ref.into());
        self
    }

    pub fn replying_to(mut self, message_id: impl Into<MessageId>) -> Self {
        self.reply_to = Some(message_id.into());
        self
    }
}

/// Turns a command into store input authored by `sender_id`.
///
/// # Errors
/// Returns `ChatError::InvalidArgument` when the message would be empty or
/// the media fields are inconsistent.
pub fn prepare_outgoing(
    command: SendMessageCommand,
    sender_id: &str,
) -> Result<NewMessage, ChatError> {
    let text = command.text.trim().to_owned();
    let media_ref = command
        .media_ref
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty());

    match (command.media_kind, &media_ref) {
        (MediaKind::None, Some(_)) => {
            return Err(ChatError::InvalidArgument(
                "media reference given without a media kind".to_owned(),
            ));
        }
        (kind, None) if kind != MediaKind::None => {
            return Err(ChatError::InvalidArgument(
                "media kind given without a media reference".to_owned(),
            ));
        }
        _ => {}
    }

    if text.is_empty() && media_ref.is_none() {
        return Err(ChatError::InvalidArgument(
            "message text must not be empty".to_owned(),
        ));
    }

    Ok(NewMessage {
        id: None,
        sender_id: sender_id.to_owned(),
        text,
        media_ref,
        media_kind: command.media_kind,
        created_at_ms: None,
        reply_to: command.reply_to,
    })
}
