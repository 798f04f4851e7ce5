//! Common state machine error types
//!
//! Shared by the publish workflow and the preview mutation log.

use thiserror::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot transition from {from} to {to} via {event}")]
    InvalidTransition {
        from: String,
        to: String,
        event: String,
    },

    #[error("Terminal state: {0} accepts no further transitions")]
    TerminalState(String),
}

impl StateError {
    /// Build an `InvalidTransition` for an event that has no target from `from`.
    pub fn invalid(from: impl ToString, event: impl ToString) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: "unknown".to_string(),
            event: event.to_string(),
        }
    }
}
