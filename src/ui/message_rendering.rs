//! Text rendering for conversations and message threads.
//!
//! Handles visual formatting of:
//! - Conversation rows (name, preview, time, unread badge, typing marker)
//! - Sender grouping (consecutive messages from one sender show the name once)
//! - Date separators between messages from different days
//! - Tombstones, edit markers, reply references and reaction badges

use chrono::{Local, TimeZone};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::{
    conversation::{Conversation, ConversationSummary},
    message::{Message, MessageId},
};

use super::styles::{self, Palette};

const NAME_COLUMN_WIDTH: usize = 18;
const PREVIEW_WIDTH: usize = 36;
const ELLIPSIS: char = '…';

/// Represents a visual element in the messages list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageListElement {
    /// Date separator line (e.g., "——— 14 Feb 2026 ———").
    DateSeparator(String),
    /// Marks where unread messages begin.
    UnreadSeparator,
    /// A message with optional sender display.
    Message {
        id: String,
        time: String,
        sender: Option<String>,
        content: String,
        deleted: bool,
        edited: bool,
        reply_to: Option<String>,
        reactions: String,
    },
}

/// Resolves sender ids to display names for one conversation.
pub struct SenderNames<'a> {
    pub current_user_id: &'a str,
    pub conversation: &'a Conversation,
}

impl SenderNames<'_> {
    fn label<'m>(&'m self, message: &'m Message) -> &'m str {
        if message.sender_id == self.current_user_id {
            "You"
        } else if message.sender_id == self.conversation.participant_id {
            &self.conversation.participant_name
        } else {
            &message.sender_id
        }
    }
}

/// Builds a list of visual elements from messages.
///
/// Groups consecutive messages from the same sender and inserts date separators.
pub fn build_message_list_elements(
    messages: &[Message],
    names: &SenderNames<'_>,
) -> Vec<MessageListElement> {
    let mut elements = Vec::new();
    let mut prev_date: Option<chrono::NaiveDate> = None;
    let mut prev_sender: Option<&str> = None;

    for message in messages {
        let msg_date = timestamp_to_date(message.created_at_ms);

        if prev_date != Some(msg_date) {
            elements.push(MessageListElement::DateSeparator(format_date(msg_date)));
            prev_sender = None;
        }

        let sender_name = names.label(message);
        let sender = (prev_sender != Some(sender_name)).then(|| sender_name.to_owned());

        elements.push(MessageListElement::Message {
            id: message.id.to_string(),
            time: format_time(message.created_at_ms),
            sender,
            content: message.display_content(),
            deleted: message.is_deleted,
            edited: message.is_edited() && !message.is_deleted,
            reply_to: message.reply_to.as_ref().map(ToString::to_string),
            reactions: reaction_badges(message),
        });

        prev_date = Some(msg_date);
        prev_sender = Some(sender_name);
    }

    elements
}

/// Inserts an unread marker before the message with `message_id`.
pub fn insert_unread_separator(elements: &mut Vec<MessageListElement>, message_id: &MessageId) {
    let position = elements.iter().position(|element| {
        matches!(element, MessageListElement::Message { id, .. } if id == message_id.0.as_str())
    });
    if let Some(index) = position {
        elements.insert(index, MessageListElement::UnreadSeparator);
    }
}

/// Renders elements as output lines.
pub fn render_message_lines(elements: &[MessageListElement], palette: Palette) -> Vec<String> {
    let mut lines = Vec::new();

    for element in elements {
        match element {
            MessageListElement::DateSeparator(date) => {
                lines.push(palette.paint(
                    styles::date_separator_style(),
                    &format!("——— {} ———", date),
                ));
            }
            MessageListElement::UnreadSeparator => {
                lines.push(palette.paint(styles::unread_count_style(), "——— new messages ———"));
            }
            MessageListElement::Message {
                id,
                time,
                sender,
                content,
                deleted,
                edited,
                reply_to,
                reactions,
            } => {
                if let Some(sender) = sender {
                    lines.push(palette.paint(styles::message_sender_style(), sender));
                }

                let mut line = format!(
                    "  {} {} ",
                    palette.paint(styles::message_time_style(), time),
                    palette.paint(styles::message_meta_style(), &format!("[{id}]")),
                );
                if let Some(target) = reply_to {
                    line.push_str(&format!("↪ {target} "));
                }
                if *deleted {
                    line.push_str(&palette.paint(styles::message_meta_style(), content));
                } else {
                    line.push_str(content);
                }
                if *edited {
                    line.push(' ');
                    line.push_str(&palette.paint(styles::message_meta_style(), "(edited)"));
                }
                if !reactions.is_empty() {
                    line.push_str("  ");
                    line.push_str(reactions);
                }
                lines.push(line);
            }
        }
    }

    lines
}

/// Renders one row of the conversation list.
pub fn render_conversation_row(summary: &ConversationSummary, palette: Palette) -> String {
    let name = pad_to_width(
        &truncate_to_width(&summary.participant_name, NAME_COLUMN_WIDTH),
        NAME_COLUMN_WIDTH,
    );

    let preview = if summary.is_typing {
        palette.paint(styles::typing_style(), "typing…")
    } else {
        let text = summary
            .last_message_preview
            .as_deref()
            .map(normalize_preview)
            .unwrap_or_else(|| "No messages yet".to_owned());
        palette.paint(
            styles::conversation_preview_style(),
            &truncate_to_width(&text, PREVIEW_WIDTH),
        )
    };

    let mut row = format!(
        "{:<4} {} {}",
        summary.id.as_str(),
        palette.paint(styles::conversation_name_style(), &name),
        preview
    );

    if let Some(timestamp_ms) = summary.last_message_at_ms {
        row.push_str("  ");
        row.push_str(&palette.paint(
            styles::message_time_style(),
            &format_conversation_timestamp(timestamp_ms),
        ));
    }

    if summary.unread_count > 0 {
        row.push_str("  ");
        row.push_str(&palette.paint(
            styles::unread_count_style(),
            &format!("[{}]", summary.unread_count),
        ));
    }

    row
}

/// Reaction counts as badges, e.g. "👍2 ❤️1".
pub fn reaction_badges(message: &Message) -> String {
    message
        .reaction_counts()
        .into_iter()
        .map(|(kind, count)| format!("{}{}", kind.emoji(), count))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cuts `text` to at most `max_width` terminal columns, marking the cut
/// with an ellipsis.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_owned();
    }

    let budget = max_width.saturating_sub(1);
    let mut width = 0;
    let mut truncated = String::new();
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > budget {
            break;
        }
        width += ch_width;
        truncated.push(ch);
    }
    truncated.push(ELLIPSIS);
    truncated
}

fn pad_to_width(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(padding))
}

fn normalize_preview(preview: &str) -> String {
    preview.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn timestamp_to_date(timestamp_ms: i64) -> chrono::NaiveDate {
    match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.date_naive(),
        chrono::LocalResult::Ambiguous(dt, _) => dt.date_naive(),
        chrono::LocalResult::None => Local::now().date_naive(),
    }
}

fn format_date(date: chrono::NaiveDate) -> String {
    // Format: "14 Feb 2026"
    date.format("%-d %b %Y").to_string()
}

fn format_time(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.format("%H:%M").to_string(),
        chrono::LocalResult::Ambiguous(dt, _) => dt.format("%H:%M").to_string(),
        chrono::LocalResult::None => "??:??".to_owned(),
    }
}

fn format_conversation_timestamp(timestamp_ms: i64) -> String {
    let datetime = match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(dt, _) => dt,
        chrono::LocalResult::None => return "     ".to_owned(),
    };

    if datetime.date_naive() == Local::now().date_naive() {
        datetime.format("%H:%M").to_string()
    } else {
        datetime.format("%d.%m").to_string()
    }
}
