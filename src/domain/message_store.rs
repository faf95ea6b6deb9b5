//! Ordered message sequences per conversation.
//!
//! Messages are never physically removed: deletion leaves a tombstone so
//! ids and reply references stay valid. The store trusts its caller on
//! ownership; sender checks live in the chat service.

use std::collections::{BTreeMap, HashMap};

use super::{
    conversation::{Conversation, ConversationId},
    error::ChatError,
    message::{Message, MessageId, NewMessage, ReactionKind},
};

#[derive(Debug, Clone)]
struct ConversationLog {
    conversation: Conversation,
    messages: Vec<Message>,
    positions: HashMap<MessageId, usize>,
    next_sequence: u64,
}

impl ConversationLog {
    fn new(conversation: Conversation) -> Self {
        Self {
            conversation,
            messages: Vec::new(),
            positions: HashMap::new(),
            next_sequence: 1,
        }
    }

    fn next_id(&mut self) -> MessageId {
        loop {
            let candidate = MessageId(format!("{}-{}", self.conversation.id, self.next_sequence));
            self.next_sequence += 1;
            if !self.positions.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn push(&mut self, message: Message) {
        self.positions
            .insert(message.id.clone(), self.messages.len());
        self.messages.push(message);
    }

    fn get_mut(&mut self, message_id: &MessageId) -> Result<&mut Message, ChatError> {
        let conversation_id = &self.conversation.id;
        match self.positions.get(message_id) {
            Some(&index) => Ok(&mut self.messages[index]),
            None => Err(ChatError::message_not_found(conversation_id, message_id)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    logs: BTreeMap<ConversationId, ConversationLog>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a conversation. Re-registering an existing id refreshes the
    /// participant details and keeps its messages. Returns true when the
    /// conversation is new.
    pub fn register(&mut self, conversation: Conversation) -> bool {
        match self.logs.get_mut(&conversation.id) {
            Some(log) => {
                log.conversation = conversation;
                false
            }
            None => {
                self.logs
                    .insert(conversation.id.clone(), ConversationLog::new(conversation));
                true
            }
        }
    }

    /// Loads previously stored messages into a registered, empty conversation.
    /// Tombstones are normalised and replies must point at an earlier message.
    pub fn restore(
        &mut self,
        conversation_id: &ConversationId,
        messages: Vec<Message>,
    ) -> Result<(), ChatError> {
        let log = self.log_mut(conversation_id)?;
        if !log.messages.is_empty() {
            return Err(ChatError::InvalidState(
                "cannot restore into a conversation that already has messages",
            ));
        }

        let mut restored = ConversationLog::new(log.conversation.clone());
        for mut message in messages {
            if restored.positions.contains_key(&message.id) {
                return Err(ChatError::InvalidArgument(format!(
                    "duplicate message id {} in conversation {}",
                    message.id, conversation_id
                )));
            }
            if let Some(reply_to) = &message.reply_to {
                if !restored.positions.contains_key(reply_to) {
                    return Err(ChatError::message_not_found(conversation_id, reply_to));
                }
            }
            if message.is_deleted {
                clear_payload(&mut message);
            }
            message.conversation_id = conversation_id.clone();
            restored.push(message);
        }
        restored.next_sequence = restored.messages.len() as u64 + 1;

        *log = restored;
        Ok(())
    }

    pub fn conversation(&self, conversation_id: &ConversationId) -> Result<&Conversation, ChatError> {
        self.log(conversation_id).map(|log| &log.conversation)
    }

    /// Registered conversations in id order.
    pub fn conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.logs.values().map(|log| &log.conversation)
    }

    /// Messages of a conversation in append order, tombstones included.
    pub fn messages(&self, conversation_id: &ConversationId) -> Result<&[Message], ChatError> {
        self.log(conversation_id).map(|log| log.messages.as_slice())
    }

    pub fn message(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<&Message, ChatError> {
        let log = self.log(conversation_id)?;
        log.positions
            .get(message_id)
            .map(|&index| &log.messages[index])
            .ok_or_else(|| ChatError::message_not_found(conversation_id, message_id))
    }

    /// Zero-based position of a message within its conversation.
    pub fn position(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<usize, ChatError> {
        self.log(conversation_id)?
            .positions
            .get(message_id)
            .copied()
            .ok_or_else(|| ChatError::message_not_found(conversation_id, message_id))
    }

    pub fn last_message(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<&Message>, ChatError> {
        self.log(conversation_id).map(|log| log.messages.last())
    }

    pub fn append(
        &mut self,
        conversation_id: &ConversationId,
        new_message: NewMessage,
        now_ms: i64,
    ) -> Result<Message, ChatError> {
        let log = self.log_mut(conversation_id)?;

        if new_message.text.trim().is_empty() && !new_message.has_media() {
            return Err(ChatError::InvalidArgument(
                "message text must not be empty".to_owned(),
            ));
        }

        if let Some(reply_to) = &new_message.reply_to {
            if !log.positions.contains_key(reply_to) {
                return Err(ChatError::message_not_found(conversation_id, reply_to));
            }
        }

        let id = match new_message.id {
            Some(id) if log.positions.contains_key(&id) => {
                return Err(ChatError::InvalidArgument(format!(
                    "message id {id} already exists in conversation {conversation_id}"
                )));
            }
            Some(id) => id,
            None => log.next_id(),
        };

        let message = Message {
            id,
            conversation_id: conversation_id.clone(),
            sender_id: new_message.sender_id,
            text: new_message.text,
            media_ref: new_message.media_ref,
            media_kind: new_message.media_kind,
            created_at_ms: new_message.created_at_ms.unwrap_or(now_ms),
            edited_at_ms: None,
            is_deleted: false,
            reactions: BTreeMap::new(),
            reply_to: new_message.reply_to,
        };

        log.push(message.clone());
        Ok(message)
    }

    pub fn edit(
        &mut self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
        new_text: &str,
        now_ms: i64,
    ) -> Result<Message, ChatError> {
        let message = self.log_mut(conversation_id)?.get_mut(message_id)?;

        if message.is_deleted {
            return Err(ChatError::InvalidState("cannot edit a deleted message"));
        }
        if new_text.trim().is_empty() {
            return Err(ChatError::InvalidArgument(
                "edited text must not be empty".to_owned(),
            ));
        }

        message.text = new_text.to_owned();
        message.edited_at_ms = Some(now_ms);
        Ok(message.clone())
    }

    /// Tombstones a message. Deleting a tombstone is a no-op.
    pub fn delete(
        &mut self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<Message, ChatError> {
        let message = self.log_mut(conversation_id)?.get_mut(message_id)?;

        if !message.is_deleted {
            message.is_deleted = true;
            clear_payload(message);
        }

        Ok(message.clone())
    }

    /// Sets (`Some`) or clears (`None`) the single reaction of `user_id`.
    pub fn react(
        &mut self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
        user_id: &str,
        kind: Option<ReactionKind>,
    ) -> Result<Message, ChatError> {
        let message = self.log_mut(conversation_id)?.get_mut(message_id)?;

        if message.is_deleted {
            return Err(ChatError::message_not_found(conversation_id, message_id));
        }

        match kind {
            Some(kind) => {
                message.reactions.insert(user_id.to_owned(), kind);
            }
            None => {
                message.reactions.remove(user_id);
            }
        }

        Ok(message.clone())
    }

    fn log(&self, conversation_id: &ConversationId) -> Result<&ConversationLog, ChatError> {
        self.logs
            .get(conversation_id)
            .ok_or_else(|| ChatError::ConversationNotFound(conversation_id.clone()))
    }

    fn log_mut(
        &mut self,
        conversation_id: &ConversationId,
    ) -> Result<&mut ConversationLog, ChatError> {
        self.logs
            .get_mut(conversation_id)
            .ok_or_else(|| ChatError::ConversationNotFound(conversation_id.clone()))
    }
}

/// Tombstones keep their id, sender and timestamps only.
fn clear_payload(message: &mut Message) {
    message.text.clear();
    message.media_ref = None;
    message.reactions.clear();
}
