use super::conversation::ConversationId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    running: bool,
    open_conversation: Option<ConversationId>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            running: true,
            open_conversation: None,
        }
    }
}

impl ShellState {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Conversation currently shown; incoming messages there are read on arrival.
    pub fn open_conversation(&self) -> Option<&ConversationId> {
        self.open_conversation.as_ref()
    }

    pub fn open(&mut self, conversation_id: ConversationId) {
        self.open_conversation = Some(conversation_id);
    }

    pub fn close(&mut self) {
        self.open_conversation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running_with_nothing_open() {
        let state = ShellState::default();

        assert!(state.is_running());
        assert_eq!(state.open_conversation(), None);
    }

    #[test]
    fn open_replaces_previous_conversation() {
        let mut state = ShellState::default();
        state.open("c1".into());
        state.open("c2".into());

        assert_eq!(state.open_conversation(), Some(&ConversationId::from("c2")));

        state.close();
        assert_eq!(state.open_conversation(), None);
    }
}
