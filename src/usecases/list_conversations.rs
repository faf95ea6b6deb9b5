use crate::domain::{conversation::ConversationSummary, error::ChatError};

use super::chat_service::ChatService;

const DEFAULT_CONVERSATION_PAGE_SIZE: usize = 50;
const MAX_CONVERSATION_PAGE_SIZE: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConversationsQuery {
    pub search: String,
    pub limit: usize,
}

impl Default for ListConversationsQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            limit: DEFAULT_CONVERSATION_PAGE_SIZE,
        }
    }
}

impl ListConversationsQuery {
    pub fn matching(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Self::default()
        }
    }

    fn normalized_limit(&self) -> usize {
        match self.limit {
            0 => DEFAULT_CONVERSATION_PAGE_SIZE,
            value if value > MAX_CONVERSATION_PAGE_SIZE => MAX_CONVERSATION_PAGE_SIZE,
            value => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConversationsOutput {
    pub conversations: Vec<ConversationSummary>,
    pub total_matches: usize,
}

pub trait ConversationsSource {
    fn search_conversations(&self, query: &str) -> Result<Vec<ConversationSummary>, ChatError>;
}

impl ConversationsSource for ChatService {
    fn search_conversations(&self, query: &str) -> Result<Vec<ConversationSummary>, ChatError> {
        ChatService::search_conversations(self, query)
    }
}

pub fn list_conversations(
    source: &dyn ConversationsSource,
    query: ListConversationsQuery,
) -> Result<ListConversationsOutput, ChatError> {
    let limit = query.normalized_limit();
    let mut conversations = source.search_conversations(&query.search)?;
    let total_matches = conversations.len();
    conversations.truncate(limit);

    Ok(ListConversationsOutput {
        conversations,
        total_matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubSource {
        result: Result<Vec<ConversationSummary>, ChatError>,
        captured_query: std::sync::Mutex<Option<String>>,
    }

    impl StubSource {
        fn with_result(result: Result<Vec<ConversationSummary>, ChatError>) -> Self {
            Self {
                result,
                captured_query: std::sync::Mutex::new(None),
            }
        }
    }

    impl ConversationsSource for StubSource {
        fn search_conversations(
            &self,
            query: &str,
        ) -> Result<Vec<ConversationSummary>, ChatError> {
            *self.captured_query.lock().expect("query lock") = Some(query.to_owned());
            self.result.clone()
        }
    }

    fn summaries(count: usize) -> Vec<ConversationSummary> {
        (0..count)
            .map(|index| ConversationSummary {
                id: format!("c{index}").into(),
                participant_id: format!("u{index}"),
                participant_name: format!("User {index}"),
                last_message_id: None,
                last_message_preview: None,
                last_message_at_ms: None,
                unread_count: 0,
                is_typing: false,
            })
            .collect()
    }

    #[test]
    fn uses_default_limit_when_query_limit_is_zero() {
        let source = StubSource::with_result(Ok(summaries(80)));

        let output = list_conversations(
            &source,
            ListConversationsQuery {
                search: String::new(),
                limit: 0,
            },
        )
        .expect("list should succeed");

        assert_eq!(output.conversations.len(), 50);
        assert_eq!(output.total_matches, 80);
    }

    #[test]
    fn caps_limit_to_maximum_boundary() {
        let source = StubSource::with_result(Ok(summaries(250)));

        let output = list_conversations(
            &source,
            ListConversationsQuery {
                search: String::new(),
                limit: 999,
            },
        )
        .expect("list should succeed");

        assert_eq!(output.conversations.len(), 200);
    }

    #[test]
    fn passes_search_text_to_source() {
        let source = StubSource::with_result(Ok(vec![]));

        let _ = list_conversations(&source, ListConversationsQuery::matching("emma"))
            .expect("list should succeed");

        assert_eq!(
            *source.captured_query.lock().expect("query lock"),
            Some("emma".to_owned())
        );
    }

    #[test]
    fn propagates_source_errors() {
        let source =
            StubSource::with_result(Err(ChatError::InvalidState("index unavailable")));

        let err = list_conversations(&source, ListConversationsQuery::default())
            .expect_err("must fail");

        assert_eq!(err, ChatError::InvalidState("index unavailable"));
    }
}
