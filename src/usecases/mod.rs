//! Use-case layer: orchestrates domain operations for the UI and CLI.

pub mod bootstrap;
pub mod chat_service;
pub mod context;
pub mod contracts;
pub mod list_conversations;
pub mod load_messages;
pub mod reply_simulator;
pub mod send_message;

/// Returns the use-case module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
