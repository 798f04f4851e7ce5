//! State machine for the publish workflow
//!
//! One publish attempt moves an editor through:
//! - `Idle` → `Creating` (item does not exist yet) or `Idle` → `Staging`
//! - `Creating` → `Staging` once the platform assigns an id
//! - `Staging` → `Submitting` once every change is queued on the update handle
//! - `Submitting` → `Done`
//! - any in-flight state → `Failed`
//!
//! `Staging` and `Submitting` together form the "updating" phase. `Done` and
//! `Failed` end an attempt but accept a new one, so an editor is reusable.

use serde::{Deserialize, Serialize};

pub use workshop_common::StateError;

// ============================================================================
// Publish State Machine
// ============================================================================

/// Phase of the current (or last) publish attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishState {
    #[default]
    Idle,
    Creating,
    Staging,
    Submitting,
    Done,
    Failed,
}

impl PublishState {
    /// Check if this state ends an attempt
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Check if an attempt is in flight
    pub fn is_publishing(&self) -> bool {
        matches!(self, Self::Creating | Self::Staging | Self::Submitting)
    }

    /// Check if the item exists and its changes are being pushed
    pub fn is_updating(&self) -> bool {
        matches!(self, Self::Staging | Self::Submitting)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [PublishState] {
        match self {
            Self::Idle | Self::Done | Self::Failed => &[Self::Creating, Self::Staging],
            Self::Creating => &[Self::Staging, Self::Failed],
            Self::Staging => &[Self::Submitting, Self::Failed],
            Self::Submitting => &[Self::Done, Self::Failed],
        }
    }
}

impl std::fmt::Display for PublishState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Creating => write!(f, "creating"),
            Self::Staging => write!(f, "staging"),
            Self::Submitting => write!(f, "submitting"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Events that drive publish state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishEvent {
    /// Attempt started for an item that does not exist yet
    CreateRequested,
    /// Attempt started for an existing item
    UpdateRequested,
    /// Platform assigned an id to the new item
    ItemCreated,
    /// All changes staged and the update submitted
    Submitted,
    /// Platform accepted the update
    Success,
    /// Validation, staging, or a platform call failed
    Failure,
}

impl std::fmt::Display for PublishEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateRequested => write!(f, "create_requested"),
            Self::UpdateRequested => write!(f, "update_requested"),
            Self::ItemCreated => write!(f, "item_created"),
            Self::Submitted => write!(f, "submitted"),
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Publish state machine
pub struct PublishStateMachine;

impl PublishStateMachine {
    /// Attempt a state transition
    ///
    /// Returns the new state if the transition is valid, or an error otherwise.
    pub fn transition(current: PublishState, event: PublishEvent) -> Result<PublishState, StateError> {
        let next = match (current, event) {
            // Starting an attempt
            (
                PublishState::Idle | PublishState::Done | PublishState::Failed,
                PublishEvent::CreateRequested,
            ) => PublishState::Creating,
            (
                PublishState::Idle | PublishState::Done | PublishState::Failed,
                PublishEvent::UpdateRequested,
            ) => PublishState::Staging,

            // From Creating
            (PublishState::Creating, PublishEvent::ItemCreated) => PublishState::Staging,

            // From Staging
            (PublishState::Staging, PublishEvent::Submitted) => PublishState::Submitting,

            // From Submitting
            (PublishState::Submitting, PublishEvent::Success) => PublishState::Done,

            // Any in-flight state can fail
            (state, PublishEvent::Failure) if state.is_publishing() => PublishState::Failed,

            (state, event) if state.is_terminal() => {
                return Err(StateError::TerminalState(format!(
                    "{state} (only a new attempt may follow, got {event})"
                )));
            }

            // Invalid transitions
            _ => return Err(StateError::invalid(current, event)),
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: PublishState, event: PublishEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}

// ============================================================================
// Tests
// ============================================================================
