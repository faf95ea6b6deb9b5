//! Keyed-record layout shared by seed datasets and persisted snapshots.

use serde::{Deserialize, Serialize};

use super::{
    conversation::{Conversation, ConversationId},
    message::{Message, MessageId},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub conversations: Vec<ConversationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: ConversationId,
    pub participant_id: String,
    pub participant_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_up_to: Option<MessageId>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl ConversationRecord {
    pub fn conversation(&self) -> Conversation {
        Conversation::new(
            self.id.clone(),
            self.participant_id.clone(),
            self.participant_name.clone(),
        )
    }
}

impl Snapshot {
    pub fn message_count(&self) -> usize {
        self.conversations
            .iter()
            .map(|record| record.messages.len())
            .sum()
    }
}
