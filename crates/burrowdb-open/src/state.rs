//! Open-request lifecycle enforcement.
//!
//! Validates transitions for one async open request:
//!
//! ```text
//! Pending -> Running | Cancelled
//! Running -> Delivered | Cancelled
//! Delivered/Cancelled -> ERROR (terminal, no further transitions)
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle phase of one open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpenPhase {
    /// Registered; no worker has started the initializer yet.
    Pending,
    /// A worker is executing the initializer.
    Running,
    /// The outcome was handed to the delivery channel (or disposed, when the
    /// origin context was already gone).
    Delivered,
    /// Cancellation was observed before outcome capture; no delivery.
    Cancelled,
}

/// Lifecycle violation raised by [`validate_transition`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition { from: OpenPhase, to: OpenPhase },

    #[error("open request is in terminal phase: {0:?}")]
    Terminal(OpenPhase),
}

/// Validate a phase transition for one open request.
///
/// Returns `Ok(())` if the transition is allowed, or a [`StateError`] if not.
pub fn validate_transition(from: OpenPhase, to: OpenPhase) -> Result<(), StateError> {
    match from {
        OpenPhase::Pending => match to {
            OpenPhase::Running | OpenPhase::Cancelled => Ok(()),
            OpenPhase::Pending | OpenPhase::Delivered => {
                Err(StateError::InvalidTransition { from, to })
            }
        },
        OpenPhase::Running => match to {
            OpenPhase::Delivered | OpenPhase::Cancelled => Ok(()),
            OpenPhase::Pending | OpenPhase::Running => {
                Err(StateError::InvalidTransition { from, to })
            }
        },
        OpenPhase::Delivered | OpenPhase::Cancelled => Err(StateError::Terminal(from)),
    }
}

/// Returns `true` if the phase is terminal (no further transitions allowed).
pub fn is_terminal(phase: OpenPhase) -> bool {
    matches!(phase, OpenPhase::Delivered | OpenPhase::Cancelled)
}
