use std::collections::HashMap;

use super::conversation::ConversationId;

/// Ephemeral per-conversation typing flags with lazy expiry.
///
/// Each entry is a deadline; last write wins and stale entries read as
/// not typing without any cleanup pass.
#[derive(Debug, Clone, Default)]
pub struct TypingSignal {
    deadlines: HashMap<ConversationId, i64>,
}

impl TypingSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `now + duration` as the deadline and returns it.
    pub fn set_typing(
        &mut self,
        conversation_id: &ConversationId,
        now_ms: i64,
        duration_ms: u64,
    ) -> i64 {
        let duration = i64::try_from(duration_ms).unwrap_or(i64::MAX);
        let until = now_ms.saturating_add(duration);
        self.deadlines.insert(conversation_id.clone(), until);
        until
    }

    pub fn is_typing(&self, conversation_id: &ConversationId, now_ms: i64) -> bool {
        self.deadlines
            .get(conversation_id)
            .is_some_and(|until| now_ms < *until)
    }

    #[cfg(test)]
    pub fn until(&self, conversation_id: &ConversationId) -> Option<i64> {
        self.deadlines.get(conversation_id).copied()
    }

    pub fn clear(&mut self, conversation_id: &ConversationId) {
        self.deadlines.remove(conversation_id);
    }
}
