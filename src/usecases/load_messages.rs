use crate::domain::{conversation::ConversationId, error::ChatError, message::Message};

use super::chat_service::ChatService;

const DEFAULT_MESSAGES_PAGE_SIZE: usize = 50;
const MAX_MESSAGES_PAGE_SIZE: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMessagesQuery {
    pub conversation_id: ConversationId,
    pub limit: usize,
}

impl LoadMessagesQuery {
    pub fn new(conversation_id: impl Into<ConversationId>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            limit: DEFAULT_MESSAGES_PAGE_SIZE,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn normalized_limit(&self) -> usize {
        match self.limit {
            0 => DEFAULT_MESSAGES_PAGE_SIZE,
            value if value > MAX_MESSAGES_PAGE_SIZE => MAX_MESSAGES_PAGE_SIZE,
            value => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMessagesOutput {
    /// Newest page of messages, oldest first.
    pub messages: Vec<Message>,
    /// Number of older messages left out of the page.
    pub older_count: usize,
}

pub trait MessagesSource {
    fn list_messages(&self, conversation_id: &ConversationId) -> Result<&[Message], ChatError>;
}

impl MessagesSource for ChatService {
    fn list_messages(&self, conversation_id: &ConversationId) -> Result<&[Message], ChatError> {
        self.get_messages(conversation_id)
    }
}

pub fn load_messages(
    source: &dyn MessagesSource,
    query: LoadMessagesQuery,
) -> Result<LoadMessagesOutput, ChatError> {
    let limit = query.normalized_limit();
    let messages = source.list_messages(&query.conversation_id)?;
    let older_count = messages.len().saturating_sub(limit);

    Ok(LoadMessagesOutput {
        messages: messages[older_count..].to_vec(),
        older_count,
    })
}
