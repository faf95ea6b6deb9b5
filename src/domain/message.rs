use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{conversation::ConversationId, error::ChatError};

/// Placeholder shown in place of a tombstoned message.
pub const DELETED_PLACEHOLDER: &str = "Message deleted";

/// Identifier of a message, unique within its conversation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Type of media attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    None,
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// Returns a display label for the media type, or None if no media.
    pub fn display_label(&self) -> Option<&'static str> {
        match self {
            MediaKind::None => None,
            MediaKind::Image => Some("[Photo]"),
            MediaKind::Video => Some("[Video]"),
            MediaKind::Audio => Some("[Voice]"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = ChatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "image" | "photo" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" | "voice" => Ok(Self::Audio),
            other => Err(ChatError::InvalidArgument(format!(
                "unknown media kind: {other}"
            ))),
        }
    }
}

/// A single reaction a user can leave on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Love,
    Laugh,
    Wow,
    Sad,
    Angry,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 6] = [
        ReactionKind::Like,
        ReactionKind::Love,
        ReactionKind::Laugh,
        ReactionKind::Wow,
        ReactionKind::Sad,
        ReactionKind::Angry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Love => "love",
            Self::Laugh => "laugh",
            Self::Wow => "wow",
            Self::Sad => "sad",
            Self::Angry => "angry",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Like => "👍",
            Self::Love => "❤️",
            Self::Laugh => "😂",
            Self::Wow => "😮",
            Self::Sad => "😢",
            Self::Angry => "😡",
        }
    }
}

impl FromStr for ReactionKind {
    type Err = ChatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let bare = strip_variation_selector(trimmed);
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.as_str().eq_ignore_ascii_case(trimmed)
                    || strip_variation_selector(kind.emoji()) == bare
            })
            .ok_or_else(|| ChatError::InvalidArgument(format!("unknown reaction kind: {trimmed}")))
    }
}

/// Emoji may arrive with or without the U+FE0F presentation selector.
fn strip_variation_selector(value: &str) -> String {
    value.chars().filter(|ch| *ch != '\u{FE0F}').collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Omitted in dataset files; the owning record supplies it on load.
    #[serde(default)]
    pub conversation_id: ConversationId,
    pub sender_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_ref: Option<String>,
    #[serde(default)]
    pub media_kind: MediaKind,
    pub created_at_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at_ms: Option<i64>,
    #[serde(default)]
    pub is_deleted: bool,
    /// One reaction per user, keyed by user id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reactions: BTreeMap<String, ReactionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
}

impl Message {
    pub fn is_edited(&self) -> bool {
        self.edited_at_ms.is_some()
    }

    pub fn is_from(&self, user_id: &str) -> bool {
        self.sender_id == user_id
    }

    /// Returns the display content: media label + text, or just text if no media.
    /// Tombstones render as a fixed placeholder.
    pub fn display_content(&self) -> String {
        if self.is_deleted {
            return DELETED_PLACEHOLDER.to_owned();
        }

        match (self.media_kind.display_label(), self.text.is_empty()) {
            (Some(label), true) => label.to_owned(),
            (Some(label), false) => format!("{} {}", label, self.text),
            (None, _) => self.text.clone(),
        }
    }

    /// Reaction counts in a stable order, skipping kinds nobody used.
    pub fn reaction_counts(&self) -> Vec<(ReactionKind, usize)> {
        ReactionKind::ALL
            .into_iter()
            .map(|kind| {
                let count = self.reactions.values().filter(|value| **value == kind).count();
                (kind, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

/// Input for appending a message. `id` and `created_at_ms` are assigned by
/// the store when absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewMessage {
    pub id: Option<MessageId>,
    pub sender_id: String,
    pub text: String,
    pub media_ref: Option<String>,
    pub media_kind: MediaKind,
    pub created_at_ms: Option<i64>,
    pub reply_to: Option<MessageId>,
}

impl NewMessage {
    pub fn text(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn with_media(mut self, kind: MediaKind, media_ref: impl Into<String>) -> Self {
        self.media_kind = kind;
        self.media_ref = Some(media_ref.into());
        self
    }

    #[cfg(test)]
    pub fn replying_to(mut self, message_id: MessageId) -> Self {
        self.reply_to = Some(message_id);
        self
    }

    pub fn at(mut self, created_at_ms: i64) -> Self {
        self.created_at_ms = Some(created_at_ms);
        self
    }

    #[cfg(test)]
    pub fn with_id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub(crate) fn has_media(&self) -> bool {
        self.media_kind != MediaKind::None && self.media_ref.is_some()
    }
}
