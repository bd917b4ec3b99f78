//! Lifecycle of a single face-fusion task.
//!
//! ```text
//! Submitted --token--> Polling --200--> Succeeded
//!     |                  |  ^
//!     |                  |  +-- pending status (202, ...)
//!     |                  +----- 400/404/500, transport error --> Failed
//!     +--- create failed -------------------------------------> Failed
//! Submitted | Polling --cancel--> Cancelled
//! ```
//!
//! Terminal states never transition again.

use serde::Serialize;

use crate::error::CoreError;

/// Current state of a fusion task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionState {
    /// The create call has been issued; no output token yet.
    Submitted,
    /// An output token was received and the status endpoint is being polled.
    Polling,
    /// The artifact was returned and stored.
    Succeeded,
    /// The external service rejected the task or a transport error occurred.
    Failed,
    /// The task was cancelled before reaching another terminal state.
    Cancelled,
}

impl FusionState {
    /// Stable lowercase name, used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Polling => "polling",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: FusionState) -> bool {
        use FusionState::*;
        matches!(
            (self, next),
            (Submitted, Polling)
                | (Submitted, Failed)
                | (Submitted, Cancelled)
                | (Polling, Polling)
                | (Polling, Succeeded)
                | (Polling, Failed)
                | (Polling, Cancelled)
        )
    }

    /// Perform a transition, rejecting illegal moves.
    pub fn transition(self, next: FusionState) -> Result<FusionState, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }
}

impl std::fmt::Display for FusionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
