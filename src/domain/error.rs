use thiserror::Error;

use super::{conversation::ConversationId, message::MessageId};

/// Failures of chat state operations.
///
/// Every variant is an expected condition: callers surface it to the user
/// and keep running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("conversation {0} not found")]
    ConversationNotFound(ConversationId),
    #[error("message {message_id} not found in conversation {conversation_id}")]
    MessageNotFound {
        conversation_id: ConversationId,
        message_id: MessageId,
    },
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("message {0} was not sent by the current user")]
    NotSender(MessageId),
}

impl ChatError {
    /// Stable code for logs and user-facing toasts.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConversationNotFound(_) | Self::MessageNotFound { .. } => "CHAT_NOT_FOUND",
            Self::InvalidState(_) => "CHAT_INVALID_STATE",
            Self::InvalidArgument(_) => "CHAT_INVALID_ARGUMENT",
            Self::NotSender(_) => "CHAT_NOT_SENDER",
        }
    }

    #[cfg(test)]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ConversationNotFound(_) | Self::MessageNotFound { .. }
        )
    }

    pub(crate) fn message_not_found(
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Self {
        Self::MessageNotFound {
            conversation_id: conversation_id.clone(),
            message_id: message_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_share_a_code() {
        let conversation = ChatError::ConversationNotFound("c1".into());
        let message = ChatError::message_not_found(&"c1".into(), &"m1".into());

        assert_eq!(conversation.code(), "CHAT_NOT_FOUND");
        assert_eq!(message.code(), "CHAT_NOT_FOUND");
        assert!(conversation.is_not_found());
        assert!(message.is_not_found());
    }

    #[test]
    fn display_names_the_missing_ids() {
        let error = ChatError::message_not_found(&"c1".into(), &"m7".into());

        assert_eq!(error.to_string(), "message m7 not found in conversation c1");
    }
}
