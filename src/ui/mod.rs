//! UI layer: line shell, command parsing, and text rendering.

pub mod command;
pub mod command_source;
pub mod message_rendering;
pub mod shell;
pub mod styles;

/// Returns the UI module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
