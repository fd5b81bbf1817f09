//! Unified error type for scheduler and runtime operations.

use burrowdb_open::StateError;

/// Errors raised while registering, starting, or cancelling open requests.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("open request not found: {0}")]
    RequestNotFound(String),

    #[error("open request already started: {0}")]
    AlreadyStarted(String),

    #[error("duplicate open request id: {0}")]
    DuplicateRequest(String),

    #[error("maximum in-flight opens reached: {0}")]
    MaxInFlightReached(usize),

    #[error("lifecycle error: {0}")]
    State(#[from] StateError),
}
