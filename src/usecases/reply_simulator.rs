//! Canned participant replies standing in for a backend.
//!
//! Replies are deadlines, not timers: the chat service asks for due
//! replies whenever it is polled.

use crate::domain::conversation::ConversationId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledReply {
    pub conversation_id: ConversationId,
    pub due_at_ms: i64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ReplySimulator {
    delay_ms: i64,
    replies: Vec<String>,
    next_reply: usize,
    pending: Vec<ScheduledReply>,
}

impl ReplySimulator {
    pub fn new(delay_ms: u64, replies: Vec<String>) -> Self {
        Self {
            delay_ms: i64::try_from(delay_ms).unwrap_or(i64::MAX),
            replies: replies
                .into_iter()
                .filter(|reply| !reply.trim().is_empty())
                .collect(),
            next_reply: 0,
            pending: Vec::new(),
        }
    }

    /// Schedules a reply for `conversation_id`, replacing one already pending
    /// there. Returns the due time, or None when no replies are configured.
    pub fn schedule(&mut self, conversation_id: &ConversationId, now_ms: i64) -> Option<i64> {
        if self.replies.is_empty() {
            return None;
        }

        let text = self.replies[self.next_reply % self.replies.len()].clone();
        self.next_reply = self.next_reply.wrapping_add(1);

        let due_at_ms = now_ms.saturating_add(self.delay_ms);
        self.pending
            .retain(|reply| &reply.conversation_id != conversation_id);
        self.pending.push(ScheduledReply {
            conversation_id: conversation_id.clone(),
            due_at_ms,
            text,
        });

        Some(due_at_ms)
    }

    /// Removes and returns replies whose deadline has passed, oldest first.
    pub fn take_due(&mut self, now_ms: i64) -> Vec<ScheduledReply> {
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|reply| reply.due_at_ms <= now_ms);
        self.pending = pending;

        due.sort_by(|left, right| {
            left.due_at_ms
                .cmp(&right.due_at_ms)
                .then_with(|| left.conversation_id.cmp(&right.conversation_id))
        });
        due
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
