//! Derived conversation summaries.
//!
//! Summaries are recomputed from the message store and read tracker on
//! every call; nothing here is cached.

use std::cmp::Ordering;

use super::{
    conversation::{Conversation, ConversationSummary},
    error::ChatError,
    message::DELETED_PLACEHOLDER,
    message_store::MessageStore,
    read_tracker::ReadTracker,
    typing::TypingSignal,
};

/// Inputs needed to derive summaries at a point in time.
pub struct IndexView<'a> {
    pub store: &'a MessageStore,
    pub reads: &'a ReadTracker,
    pub typing: &'a TypingSignal,
    pub current_user_id: &'a str,
    pub now_ms: i64,
}

impl IndexView<'_> {
    pub fn summarize(&self, conversation: &Conversation) -> Result<ConversationSummary, ChatError> {
        let messages = self.store.messages(&conversation.id)?;
        let latest_visible = messages.iter().rev().find(|message| !message.is_deleted);

        let last_message_preview = match (latest_visible, messages.is_empty()) {
            (Some(message), _) => Some(message.display_content()),
            (None, false) => Some(DELETED_PLACEHOLDER.to_owned()),
            (None, true) => None,
        };

        Ok(ConversationSummary {
            id: conversation.id.clone(),
            participant_id: conversation.participant_id.clone(),
            participant_name: conversation.participant_name.clone(),
            last_message_id: latest_visible.map(|message| message.id.clone()),
            last_message_preview,
            last_message_at_ms: messages.iter().map(|message| message.created_at_ms).max(),
            unread_count: self
                .reads
                .unread_count(self.store, &conversation.id, self.current_user_id)?,
            is_typing: self.typing.is_typing(&conversation.id, self.now_ms),
        })
    }

    /// All conversations, most recent activity first.
    pub fn conversations(&self) -> Result<Vec<ConversationSummary>, ChatError> {
        let mut summaries = self
            .store
            .conversations()
            .map(|conversation| self.summarize(conversation))
            .collect::<Result<Vec<_>, _>>()?;

        summaries.sort_by(compare_summaries);
        Ok(summaries)
    }
}

/// Latest activity descending; conversations without messages last; ties by id.
pub fn compare_summaries(left: &ConversationSummary, right: &ConversationSummary) -> Ordering {
    match (left.last_message_at_ms, right.last_message_at_ms) {
        (Some(l), Some(r)) => r.cmp(&l),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| left.id.cmp(&right.id))
}
