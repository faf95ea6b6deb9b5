//! Conversation state engine exposed to the UI layer.
//!
//! `ChatService` owns the message store, read cursors, typing signals and
//! the reply simulator. It is the only mutation path: callers hold it by
//! `&mut` and every operation either completes or leaves state untouched.

use crate::domain::{
    clock::Clock,
    conversation::{Conversation, ConversationId, ConversationSummary},
    conversation_index::IndexView,
    error::ChatError,
    message::{Message, MessageId, NewMessage, ReactionKind},
    message_store::MessageStore,
    read_tracker::ReadTracker,
    search,
    snapshot::{ConversationRecord, Snapshot},
    typing::TypingSignal,
};

use super::{
    reply_simulator::ReplySimulator,
    send_message::{prepare_outgoing, SendMessageCommand},
};

const CHAT_MESSAGE_SENT: &str = "CHAT_MESSAGE_SENT";
const CHAT_MESSAGE_RECEIVED: &str = "CHAT_MESSAGE_RECEIVED";
const CHAT_MESSAGE_EDITED: &str = "CHAT_MESSAGE_EDITED";
const CHAT_MESSAGE_DELETED: &str = "CHAT_MESSAGE_DELETED";
const CHAT_REACTION_CHANGED: &str = "CHAT_REACTION_CHANGED";
const CHAT_MARKED_READ: &str = "CHAT_MARKED_READ";
const CHAT_SNAPSHOT_RESTORED: &str = "CHAT_SNAPSHOT_RESTORED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPolicy {
    pub current_user_id: String,
    pub typing_duration_ms: u64,
    /// Reject edit/delete of messages the current user did not send.
    pub enforce_sender_only: bool,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            current_user_id: "me".to_owned(),
            typing_duration_ms: 3_000,
            enforce_sender_only: true,
        }
    }
}

pub struct ChatService {
    store: MessageStore,
    reads: ReadTracker,
    typing: TypingSignal,
    simulator: Option<ReplySimulator>,
    policy: ChatPolicy,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("policy", &self.policy)
            .field("conversations", &self.store.conversations().count())
            .field("simulator", &self.simulator.is_some())
            .finish()
    }
}

impl ChatService {
    pub fn new(policy: ChatPolicy, clock: Box<dyn Clock>) -> Self {
        Self {
            store: MessageStore::new(),
            reads: ReadTracker::new(),
            typing: TypingSignal::new(),
            simulator: None,
            policy,
            clock,
        }
    }

    pub fn with_simulator(mut self, simulator: ReplySimulator) -> Self {
        self.simulator = Some(simulator);
        self
    }

    pub fn policy(&self) -> &ChatPolicy {
        &self.policy
    }

    pub fn register_conversation(&mut self, conversation: Conversation) -> bool {
        self.store.register(conversation)
    }

    /// Loads a dataset or persisted snapshot into an empty service.
    /// Either every record is applied or the service is left unchanged.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<(), ChatError> {
        let message_count = snapshot.message_count();
        let conversation_count = snapshot.conversations.len();

        let mut store = self.store.clone();
        let mut reads = self.reads.clone();
        for record in snapshot.conversations {
            let conversation = record.conversation();
            if !store.register(conversation) {
                return Err(ChatError::InvalidArgument(format!(
                    "duplicate conversation id {}",
                    record.id
                )));
            }
            store.restore(&record.id, record.messages)?;
            if let Some(read_up_to) = record.read_up_to {
                reads.restore(&store, &record.id, read_up_to)?;
            }
        }
        self.store = store;
        self.reads = reads;

        tracing::info!(
            code = CHAT_SNAPSHOT_RESTORED,
            conversations = conversation_count,
            messages = message_count,
            "chat state restored"
        );
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        let conversations = self
            .store
            .conversations()
            .map(|conversation| ConversationRecord {
                id: conversation.id.clone(),
                participant_id: conversation.participant_id.clone(),
                participant_name: conversation.participant_name.clone(),
                read_up_to: self.reads.cursor(&conversation.id).cloned(),
                messages: self
                    .store
                    .messages(&conversation.id)
                    .map(<[Message]>::to_vec)
                    .unwrap_or_default(),
            })
            .collect();

        Snapshot { conversations }
    }

    pub fn send_message(&mut self, command: SendMessageCommand) -> Result<Message, ChatError> {
        let conversation_id = command.conversation_id.clone();
        let new_message = prepare_outgoing(command, &self.policy.current_user_id)?;
        let now_ms = self.clock.now_ms();
        let message = self.store.append(&conversation_id, new_message, now_ms)?;

        tracing::debug!(
            code = CHAT_MESSAGE_SENT,
            conversation_id = %conversation_id,
            message_id = %message.id,
            "message appended"
        );

        if let Some(simulator) = self.simulator.as_mut() {
            if let Some(due_at_ms) = simulator.schedule(&conversation_id, now_ms) {
                let duration = u64::try_from(due_at_ms.saturating_sub(now_ms)).unwrap_or(0);
                self.typing.set_typing(&conversation_id, now_ms, duration);
            }
        }

        Ok(message)
    }

    /// Appends a message authored by someone else, e.g. from a transport.
    /// Any typing signal for the conversation ends with it.
    pub fn receive_message(
        &mut self,
        conversation_id: &ConversationId,
        new_message: NewMessage,
    ) -> Result<Message, ChatError> {
        let now_ms = self.clock.now_ms();
        let message = self.store.append(conversation_id, new_message, now_ms)?;
        self.typing.clear(conversation_id);

        tracing::debug!(
            code = CHAT_MESSAGE_RECEIVED,
            conversation_id = %conversation_id,
            message_id = %message.id,
            "message received"
        );
        Ok(message)
    }

    /// Appends simulated replies whose deadline has passed.
    pub fn deliver_due_replies(&mut self) -> Vec<Message> {
        let now_ms = self.clock.now_ms();
        let Some(simulator) = self.simulator.as_mut() else {
            return Vec::new();
        };

        let mut delivered = Vec::new();
        for reply in simulator.take_due(now_ms) {
            let participant_id = match self.store.conversation(&reply.conversation_id) {
                Ok(conversation) => conversation.participant_id.clone(),
                Err(error) => {
                    tracing::warn!(code = error.code(), error = %error, "dropping simulated reply");
                    continue;
                }
            };

            let new_message = NewMessage::text(participant_id, reply.text).at(reply.due_at_ms);
            match self.receive_message(&reply.conversation_id, new_message) {
                Ok(message) => delivered.push(message),
                Err(error) => {
                    tracing::warn!(code = error.code(), error = %error, "dropping simulated reply");
                }
            }
        }

        delivered
    }

    pub fn mark_as_read(
        &mut self,
        conversation_id: &ConversationId,
    ) -> Result<Option<MessageId>, ChatError> {
        let cursor = self.reads.mark_read(&self.store, conversation_id)?;

        tracing::debug!(
            code = CHAT_MARKED_READ,
            conversation_id = %conversation_id,
            cursor = ?cursor,
            "read cursor moved"
        );
        Ok(cursor)
    }

    pub fn add_reaction(
        &mut self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
        kind: ReactionKind,
    ) -> Result<Message, ChatError> {
        self.set_reaction(conversation_id, message_id, Some(kind))
    }

    pub fn remove_reaction(
        &mut self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<Message, ChatError> {
        self.set_reaction(conversation_id, message_id, None)
    }

    pub fn edit_message(
        &mut self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
        new_text: &str,
    ) -> Result<Message, ChatError> {
        self.ensure_sender(conversation_id, message_id)?;

        let now_ms = self.clock.now_ms();
        let message = self
            .store
            .edit(conversation_id, message_id, new_text.trim(), now_ms)?;

        tracing::debug!(
            code = CHAT_MESSAGE_EDITED,
            conversation_id = %conversation_id,
            message_id = %message_id,
            "message edited"
        );
        Ok(message)
    }

    pub fn delete_message(
        &mut self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<Message, ChatError> {
        self.ensure_sender(conversation_id, message_id)?;

        let message = self.store.delete(conversation_id, message_id)?;

        tracing::debug!(
            code = CHAT_MESSAGE_DELETED,
            conversation_id = %conversation_id,
            message_id = %message_id,
            "message tombstoned"
        );
        Ok(message)
    }

    /// Marks the participant of `conversation_id` as typing. Uses the
    /// configured duration when `duration_ms` is None.
    pub fn set_typing(
        &mut self,
        conversation_id: &ConversationId,
        duration_ms: Option<u64>,
    ) -> Result<i64, ChatError> {
        self.store.conversation(conversation_id)?;

        let duration = duration_ms.unwrap_or(self.policy.typing_duration_ms);
        Ok(self
            .typing
            .set_typing(conversation_id, self.clock.now_ms(), duration))
    }

    pub fn is_typing(&self, conversation_id: &ConversationId) -> bool {
        self.typing.is_typing(conversation_id, self.clock.now_ms())
    }

    /// Messages in send order, tombstones included.
    pub fn get_messages(&self, conversation_id: &ConversationId) -> Result<&[Message], ChatError> {
        self.store.messages(conversation_id)
    }

    pub fn conversation(&self, conversation_id: &ConversationId) -> Result<&Conversation, ChatError> {
        self.store.conversation(conversation_id)
    }

    pub fn conversations(&self) -> Result<Vec<ConversationSummary>, ChatError> {
        self.index_view().conversations()
    }

    pub fn search_conversations(&self, query: &str) -> Result<Vec<ConversationSummary>, ChatError> {
        Ok(search::search(&self.conversations()?, query))
    }

    pub fn unread_count(&self, conversation_id: &ConversationId) -> Result<u32, ChatError> {
        self.reads
            .unread_count(&self.store, conversation_id, &self.policy.current_user_id)
    }

    pub fn total_unread(&self) -> Result<u32, ChatError> {
        self.conversations().map(|summaries| {
            summaries
                .iter()
                .fold(0u32, |total, summary| total.saturating_add(summary.unread_count))
        })
    }

    pub fn is_read(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<bool, ChatError> {
        self.reads.is_read(
            &self.store,
            conversation_id,
            message_id,
            &self.policy.current_user_id,
        )
    }

    fn set_reaction(
        &mut self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
        kind: Option<ReactionKind>,
    ) -> Result<Message, ChatError> {
        let message = self.store.react(
            conversation_id,
            message_id,
            &self.policy.current_user_id,
            kind,
        )?;

        tracing::debug!(
            code = CHAT_REACTION_CHANGED,
            conversation_id = %conversation_id,
            message_id = %message_id,
            reaction = kind.map(ReactionKind::as_str),
            "reaction updated"
        );
        Ok(message)
    }

    fn ensure_sender(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<(), ChatError> {
        let message = self.store.message(conversation_id, message_id)?;
        if self.policy.enforce_sender_only && !message.is_from(&self.policy.current_user_id) {
            return Err(ChatError::NotSender(message_id.clone()));
        }
        Ok(())
    }

    fn index_view(&self) -> IndexView<'_> {
        IndexView {
            store: &self.store,
            reads: &self.reads,
            typing: &self.typing,
            current_user_id: &self.policy.current_user_id,
            now_ms: self.clock.now_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::domain::{clock::ManualClock, message::MediaKind};

    fn c1() -> ConversationId {
        "c1".into()
    }

    fn service_with_clock(clock: &ManualClock) -> ChatService {
        let mut service = ChatService::new(ChatPolicy::default(), Box::new(clock.clone()));
        service.register_conversation(Conversation::new("c1", "u2", "Emma Wilson"));
        service.register_conversation(Conversation::new("c2", "u3", "Liam Chen"));
        service
    }

    fn service() -> ChatService {
        service_with_clock(&ManualClock::at(1_000))
    }

    fn incoming(service: &mut ChatService, conversation: &str, text: &str) -> Message {
        service
            .receive_message(&conversation.into(), NewMessage::text("u2", text))
            .expect("receive")
    }

    #[test]
    fn scenario_receive_read_edit() {
        let clock = ManualClock::at(1_000);
        let mut service = service_with_clock(&clock);
        service.policy.enforce_sender_only = false;

        let hi = incoming(&mut service, "c1", "hi");
        let messages = service.get_messages(&c1()).expect("exists");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hi");

        service.mark_as_read(&c1()).expect("mark read");
        assert_eq!(service.unread_count(&c1()), Ok(0));

        clock.advance(10);
        service
            .edit_message(&c1(), &hi.id, "hello")
            .expect("edit allowed when policy is loose");

        let stored = &service.get_messages(&c1()).expect("exists")[0];
        assert_eq!(stored.text, "hello");
        assert_eq!(stored.edited_at_ms, Some(1_010));
    }

    #[test]
    fn sent_messages_keep_call_order_and_unique_ids() {
        let mut service = service();

        for text in ["a", "b", "c"] {
            service
                .send_message(SendMessageCommand::text("c1", text))
                .expect("send");
        }

        let messages = service.get_messages(&c1()).expect("exists");
        let texts: Vec<_> = messages.iter().map(|m| m.text.as_str()).collect();
        let ids: HashSet<_> = messages.iter().map(|m| &m.id).collect();
        assert_eq!(texts, ["a", "b", "c"]);
        assert_eq!(ids.len(), 3);
        assert!(messages.iter().all(|m| m.sender_id == "me"));
    }

    #[test]
    fn send_to_unknown_conversation_is_not_found() {
        let mut service = service();

        let err = service
            .send_message(SendMessageCommand::text("nope", "hi"))
            .expect_err("unknown conversation");

        assert!(err.is_not_found());
    }

    #[test]
    fn new_incoming_message_after_read_counts_as_unread() {
        let mut service = service();
        for text in ["1", "2", "3"] {
            incoming(&mut service, "c1", text);
        }
        service.mark_as_read(&c1()).expect("mark read");

        incoming(&mut service, "c1", "4");

        assert_eq!(service.unread_count(&c1()), Ok(1));
        assert_eq!(service.total_unread(), Ok(1));
    }

    #[test]
    fn edit_of_foreign_message_is_rejected_when_sender_only() {
        let mut service = service();
        let theirs = incoming(&mut service, "c1", "hi");

        let err = service
            .edit_message(&c1(), &theirs.id, "hijacked")
            .expect_err("foreign edit");

        assert_eq!(err, ChatError::NotSender(theirs.id.clone()));
        assert_eq!(service.get_messages(&c1()).expect("exists")[0].text, "hi");
    }

    #[test]
    fn delete_twice_matches_delete_once() {
        let mut service = service();
        let mine = service
            .send_message(SendMessageCommand::text("c1", "oops"))
            .expect("send");

        let once = service.delete_message(&c1(), &mine.id).expect("delete");
        let after_once = service.snapshot();
        let twice = service.delete_message(&c1(), &mine.id).expect("delete again");

        assert_eq!(once, twice);
        assert_eq!(service.snapshot(), after_once);
    }

    #[test]
    fn edit_after_delete_is_invalid_state() {
        let mut service = service();
        let mine = service
            .send_message(SendMessageCommand::text("c1", "oops"))
            .expect("send");
        service.delete_message(&c1(), &mine.id).expect("delete");

        let err = service
            .edit_message(&c1(), &mine.id, "fixed")
            .expect_err("edit tombstone");

        assert!(matches!(err, ChatError::InvalidState(_)));
    }

    #[test]
    fn reaction_set_then_removed_leaves_none() {
        let mut service = service();
        let theirs = incoming(&mut service, "c1", "look");

        service
            .add_reaction(&c1(), &theirs.id, ReactionKind::Love)
            .expect("react");
        let cleared = service.remove_reaction(&c1(), &theirs.id).expect("unreact");

        assert!(!cleared.reactions.contains_key("me"));
    }

    #[test]
    fn typing_expires_lazily() {
        let clock = ManualClock::at(0);
        let mut service = service_with_clock(&clock);

        service.set_typing(&c1(), Some(2_000)).expect("typing");
        assert!(service.is_typing(&c1()));

        clock.advance(2_000);
        assert!(!service.is_typing(&c1()));
    }

    #[test]
    fn set_typing_on_unknown_conversation_is_not_found() {
        let mut service = service();

        assert!(service
            .set_typing(&"nope".into(), None)
            .expect_err("unknown")
            .is_not_found());
    }

    #[test]
    fn search_filters_and_empty_query_returns_all() {
        let mut service = service();
        incoming(&mut service, "c2", "newest");

        let all = service.search_conversations("").expect("search");
        let emma = service.search_conversations("emma").expect("search");
        let none = service.search_conversations("xyz-no-match").expect("search");

        assert_eq!(all, service.conversations().expect("list"));
        assert_eq!(all[0].id, ConversationId::from("c2"));
        assert_eq!(emma.len(), 1);
        assert!(none.is_empty());
    }

    #[test]
    fn simulated_reply_sets_typing_then_arrives() {
        let clock = ManualClock::at(10_000);
        let mut service = service_with_clock(&clock)
            .with_simulator(ReplySimulator::new(1_500, vec!["Sounds good!".to_owned()]));

        service
            .send_message(SendMessageCommand::text("c1", "dinner?"))
            .expect("send");
        assert!(service.is_typing(&c1()));
        assert!(service.deliver_due_replies().is_empty());

        clock.advance(1_500);
        let delivered = service.deliver_due_replies();

        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].sender_id, "u2");
        assert_eq!(delivered[0].created_at_ms, 11_500);
        assert!(!service.is_typing(&c1()));
        assert_eq!(service.unread_count(&c1()), Ok(1));
    }

    #[test]
    fn snapshot_round_trip_preserves_cursor_and_tombstones() {
        let mut service = service();
        let theirs = incoming(&mut service, "c1", "hi");
        service.mark_as_read(&c1()).expect("read");
        let mine = service
            .send_message(
                SendMessageCommand::text("c1", "").with_media(MediaKind::Image, "pic.jpg"),
            )
            .expect("send");
        service.delete_message(&c1(), &mine.id).expect("delete");

        let snapshot = service.snapshot();
        let mut restored = ChatService::new(ChatPolicy::default(), Box::new(ManualClock::at(0)));
        restored.restore(snapshot.clone()).expect("restore");

        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.is_read(&c1(), &theirs.id), Ok(true));
        assert!(restored.get_messages(&c1()).expect("exists")[1].is_deleted);
    }

    #[test]
    fn restore_rejects_duplicate_conversation_ids() {
        let record = ConversationRecord {
            id: "c1".into(),
            participant_id: "u2".to_owned(),
            participant_name: "Emma".to_owned(),
            read_up_to: None,
            messages: Vec::new(),
        };
        let mut service = ChatService::new(ChatPolicy::default(), Box::new(ManualClock::at(0)));

        let err = service
            .restore(Snapshot {
                conversations: vec![record.clone(), record],
            })
            .expect_err("duplicate conversation");

        assert!(matches!(err, ChatError::InvalidArgument(_)));
    }

    #[test]
    fn failed_restore_leaves_no_partial_state() {
        let record = |id: &str| ConversationRecord {
            id: id.into(),
            participant_id: format!("u-{id}"),
            participant_name: format!("User {id}"),
            read_up_to: None,
            messages: Vec::new(),
        };
        let mut service = ChatService::new(ChatPolicy::default(), Box::new(ManualClock::at(0)));

        service
            .restore(Snapshot {
                conversations: vec![record("a"), record("b"), record("a")],
            })
            .expect_err("duplicate conversation");

        assert!(service.conversations().expect("list").is_empty());
    }

    #[test]
    fn restore_with_unknown_read_cursor_keeps_existing_state() {
        let mut service = service();
        incoming(&mut service, "c1", "before");
        let broken = ConversationRecord {
            id: "c9".into(),
            participant_id: "u9".to_owned(),
            participant_name: "Ghost".to_owned(),
            read_up_to: Some("nowhere".into()),
            messages: Vec::new(),
        };

        let err = service
            .restore(Snapshot {
                conversations: vec![broken],
            })
            .expect_err("unknown cursor");

        assert!(err.is_not_found());
        assert!(service.conversation(&"c9".into()).is_err());
        assert_eq!(service.get_messages(&c1()).expect("exists").len(), 1);
    }
}
