//! Domain error types

use crate::agent::status::AgentStatus;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An agent status change violated the lifecycle transition table.
    /// The handle's status is left unchanged when this is returned.
    #[error("Invalid transition: {from} -> {to} for agent '{agent}'")]
    InvalidTransition {
        agent: String,
        from: AgentStatus,
        to: AgentStatus,
    },

    /// A compost operation referenced a key with no current entry.
    #[error("No compost entry with key '{key}'")]
    KeyNotFound { key: String },
}
