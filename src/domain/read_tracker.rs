use std::collections::HashMap;

use super::{
    conversation::ConversationId,
    error::ChatError,
    message::{Message, MessageId},
    message_store::MessageStore,
};

/// Per-conversation read cursors of the current user.
#[derive(Debug, Clone, Default)]
pub struct ReadTracker {
    cursors: HashMap<ConversationId, MessageId>,
}

impl ReadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self, conversation_id: &ConversationId) -> Option<&MessageId> {
        self.cursors.get(conversation_id)
    }

    /// Moves the cursor to the last message present at call time.
    /// Returns the new cursor, or None when the conversation is empty.
    pub fn mark_read(
        &mut self,
        store: &MessageStore,
        conversation_id: &ConversationId,
    ) -> Result<Option<MessageId>, ChatError> {
        let Some(last) = store.last_message(conversation_id)? else {
            return Ok(None);
        };

        self.cursors
            .insert(conversation_id.clone(), last.id.clone());
        Ok(Some(last.id.clone()))
    }

    /// Restores a persisted cursor. Unknown message ids are rejected.
    pub fn restore(
        &mut self,
        store: &MessageStore,
        conversation_id: &ConversationId,
        read_up_to: MessageId,
    ) -> Result<(), ChatError> {
        store.position(conversation_id, &read_up_to)?;
        self.cursors.insert(conversation_id.clone(), read_up_to);
        Ok(())
    }

    pub fn is_read(
        &self,
        store: &MessageStore,
        conversation_id: &ConversationId,
        message_id: &MessageId,
        current_user_id: &str,
    ) -> Result<bool, ChatError> {
        let message = store.message(conversation_id, message_id)?;
        if message.is_from(current_user_id) {
            return Ok(true);
        }

        let position = store.position(conversation_id, message_id)?;
        Ok(self
            .cursor_position(store, conversation_id)?
            .is_some_and(|cursor| position <= cursor))
    }

    /// Messages strictly after the cursor that are neither self-authored nor
    /// tombstoned.
    pub fn unread_count(
        &self,
        store: &MessageStore,
        conversation_id: &ConversationId,
        current_user_id: &str,
    ) -> Result<u32, ChatError> {
        let messages = store.messages(conversation_id)?;
        let start = match self.cursor_position(store, conversation_id)? {
            Some(cursor) => cursor + 1,
            None => 0,
        };

        let count = messages
            .iter()
            .skip(start)
            .filter(|message| counts_as_unread(message, current_user_id))
            .count();

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    fn cursor_position(
        &self,
        store: &MessageStore,
        conversation_id: &ConversationId,
    ) -> Result<Option<usize>, ChatError> {
        match self.cursors.get(conversation_id) {
            Some(cursor) => store.position(conversation_id, cursor).map(Some),
            None => Ok(None),
        }
    }
}

fn counts_as_unread(message: &Message, current_user_id: &str) -> bool {
    !message.is_deleted && !message.is_from(current_user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{conversation::Conversation, message::NewMessage};

    const ME: &str = "me";

    fn c1() -> ConversationId {
        "c1".into()
    }

    fn store() -> MessageStore {
        let mut store = MessageStore::new();
        store.register(Conversation::new("c1", "u2", "Emma"));
        store
    }

    fn send(store: &mut MessageStore, sender: &str, text: &str) -> MessageId {
        store
            .append(&c1(), NewMessage::text(sender, text), 1)
            .expect("append")
            .id
    }

    #[test]
    fn mark_read_on_empty_conversation_sets_no_cursor() {
        let store = store();
        let mut tracker = ReadTracker::new();

        let cursor = tracker.mark_read(&store, &c1()).expect("known conversation");

        assert_eq!(cursor, None);
        assert_eq!(tracker.unread_count(&store, &c1(), ME), Ok(0));
    }

    #[test]
    fn mark_read_unknown_conversation_is_not_found() {
        let store = MessageStore::new();
        let mut tracker = ReadTracker::new();

        let err = tracker.mark_read(&store, &c1()).expect_err("unknown");

        assert!(err.is_not_found());
    }

    #[test]
    fn unread_count_drops_to_zero_after_mark_read_and_tracks_new_arrivals() {
        let mut store = store();
        let mut tracker = ReadTracker::new();
        for text in ["a", "b", "c"] {
            send(&mut store, "u2", text);
        }
        assert_eq!(tracker.unread_count(&store, &c1(), ME), Ok(3));

        tracker.mark_read(&store, &c1()).expect("mark read");
        assert_eq!(tracker.unread_count(&store, &c1(), ME), Ok(0));

        send(&mut store, "u2", "d");
        assert_eq!(tracker.unread_count(&store, &c1(), ME), Ok(1));
    }

    #[test]
    fn self_authored_messages_never_count_as_unread() {
        let mut store = store();
        let tracker = ReadTracker::new();
        let mine = send(&mut store, ME, "hello");
        send(&mut store, "u2", "hey");

        assert_eq!(tracker.unread_count(&store, &c1(), ME), Ok(1));
        assert_eq!(tracker.is_read(&store, &c1(), &mine, ME), Ok(true));
    }

    #[test]
    fn is_read_compares_positions_against_cursor() {
        let mut store = store();
        let mut tracker = ReadTracker::new();
        let first = send(&mut store, "u2", "first");
        tracker.mark_read(&store, &c1()).expect("mark read");
        let second = send(&mut store, "u2", "second");

        assert_eq!(tracker.is_read(&store, &c1(), &first, ME), Ok(true));
        assert_eq!(tracker.is_read(&store, &c1(), &second, ME), Ok(false));
    }

    #[test]
    fn tombstones_after_cursor_are_not_unread() {
        let mut store = store();
        let tracker = ReadTracker::new();
        let id = send(&mut store, "u2", "oops");
        store.delete(&c1(), &id).expect("delete");

        assert_eq!(tracker.unread_count(&store, &c1(), ME), Ok(0));
    }

    #[test]
    fn restore_rejects_unknown_cursor() {
        let store = store();
        let mut tracker = ReadTracker::new();

        let err = tracker
            .restore(&store, &c1(), "ghost".into())
            .expect_err("unknown cursor");

        assert!(err.is_not_found());
        assert_eq!(tracker.cursor(&c1()), None);
    }
}
