//! Domain layer: core entities and business rules.

pub mod clock;
pub mod conversation;
pub mod conversation_index;
pub mod error;
pub mod message;
pub mod message_store;
pub mod read_tracker;
pub mod search;
pub mod shell_state;
pub mod snapshot;
pub mod typing;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
