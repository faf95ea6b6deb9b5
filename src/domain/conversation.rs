use std::fmt;

use serde::{Deserialize, Serialize};

use super::message::MessageId;

#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A channel between the current user and one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub participant_id: String,
    pub participant_name: String,
}

impl Conversation {
    pub fn new(
        id: impl Into<ConversationId>,
        participant_id: impl Into<String>,
        participant_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            participant_id: participant_id.into(),
            participant_name: participant_name.into(),
        }
    }
}

/// Derived view of one conversation for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub participant_id: String,
    pub participant_name: String,
    /// Most recent non-deleted message, if any.
    pub last_message_id: Option<MessageId>,
    /// Preview of the last message; a placeholder when every message is deleted.
    pub last_message_preview: Option<String>,
    /// Timestamp of the latest message in the sequence, tombstones included.
    pub last_message_at_ms: Option<i64>,
    pub unread_count: u32,
    pub is_typing: bool,
}
