//! Style definitions for shell output.

use crossterm::style::{Attribute, Color, ContentStyle};

fn style(fg: Color, bold: bool) -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = Some(fg);
    if bold {
        style.attributes.set(Attribute::Bold);
    }
    style
}

// =============================================================================
// Conversation list styles
// =============================================================================

/// Style for participant name (bold, bright).
pub fn conversation_name_style() -> ContentStyle {
    style(Color::White, true)
}

/// Style for message preview text (dimmed).
pub fn conversation_preview_style() -> ContentStyle {
    style(Color::DarkGrey, false)
}

/// Style for unread count badge (green).
pub fn unread_count_style() -> ContentStyle {
    style(Color::Green, true)
}

/// Style for the typing indicator.
pub fn typing_style() -> ContentStyle {
    style(Color::Yellow, false)
}

// =============================================================================
// Message list styles
// =============================================================================

pub fn message_sender_style() -> ContentStyle {
    style(Color::White, true)
}

pub fn message_time_style() -> ContentStyle {
    style(Color::DarkGrey, false)
}

/// Style for tombstones and `(edited)` markers.
pub fn message_meta_style() -> ContentStyle {
    style(Color::DarkGrey, false)
}

pub fn date_separator_style() -> ContentStyle {
    style(Color::DarkGrey, false)
}

// =============================================================================
// Feedback styles
// =============================================================================

pub fn error_style() -> ContentStyle {
    style(Color::Red, true)
}

pub fn notice_style() -> ContentStyle {
    style(Color::Cyan, false)
}

/// Applies styles only when colour output is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn paint(&self, style: ContentStyle, text: &str) -> String {
        if self.color {
            style.apply(text).to_string()
        } else {
            text.to_owned()
        }
    }
}
