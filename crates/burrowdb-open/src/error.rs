//! Failure taxonomy carried from the worker context to the origin context.

use thiserror::Error;

/// Result type alias for open-protocol operations.
pub type OpenResult<T> = Result<T, OpenError>;

/// Failure produced while opening a store.
///
/// Whatever the engine-owned initializer raises — schema mismatch, failed
/// migration, asset copy problems — is captured as data on the worker
/// context and replayed on the origin context. This layer never inspects
/// the cause beyond classifying how it surfaced.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The initializer returned an error.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// The initializer panicked on the worker context.
    #[error("initializer panicked: {0}")]
    InitializerPanic(String),

    /// The open request referenced an unusable configuration.
    #[error("invalid store configuration: {0}")]
    Configuration(String),

    /// Engine-level I/O reported while opening the store.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}
