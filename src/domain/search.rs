use super::conversation::ConversationSummary;

/// Case-insensitive substring filter on participant names.
///
/// Keeps the input order. A blank query matches everything.
pub fn search(summaries: &[ConversationSummary], query: &str) -> Vec<ConversationSummary> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return summaries.to_vec();
    }

    summaries
        .iter()
        .filter(|summary| summary.participant_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
