//! # burrowdb async open — protocol data model
//!
//! **Types for the asynchronous open-and-deliver pipeline of the burrowdb
//! client library.**
//!
//! Opening a store for the first time in a process can be slow: the engine
//! validates schemas, runs migrations, copies bundled assets, and executes
//! initial-data transactions. To keep that work off the origin context, the
//! caller submits an [`OpenRequest`] bound to a [`ConfigKey`]; the
//! engine-owned initializer runs on a worker task and produces exactly one
//! [`OpenOutcome`]; the outcome is marshaled back to the origin context and
//! handed to an [`InstanceCallback`] — at most one of `on_success` /
//! `on_error` fires, at most once.
//!
//! ## Quick Start
//!
//! ```rust
//! use burrowdb_open::prelude::*;
//!
//! let callback = CallbackFn::new(|handle: Vec<u8>| drop(handle))
//!     .with_error(|err| eprintln!("open failed: {err}"));
//!
//! let request = OpenRequest::with_initializer(
//!     ConfigKey::new("stores/default.burrow"),
//!     |_key| async { Ok::<_, OpenError>(vec![1u8, 2, 3]) },
//!     Box::new(callback),
//! );
//! assert_eq!(request.config().as_str(), "stores/default.burrow");
//! ```
//!
//! ## Architecture
//!
//! - [`request`] — configuration identity, request, outcome, initializer alias
//! - [`callback`] — delivery contract with a loud-by-default error path
//! - [`state`] — request lifecycle state machine
//! - [`record`] — serializable bookkeeping model (no runtime handles)
//! - [`error`] — failure taxonomy carried across contexts
//!
//! Runtime concerns — scheduling, cancellation, cross-context delivery —
//! live in `burrowdb-runtime`.

pub mod callback;
pub mod error;
pub mod prelude;
pub mod record;
pub mod request;
pub mod state;

// Re-exports for convenience
pub use callback::{CallbackFn, InstanceCallback};
pub use error::{OpenError, OpenResult};
pub use record::OpenRecord;
pub use request::{BoxedInitializer, ConfigKey, OpenOutcome, OpenRequest};
pub use state::{OpenPhase, StateError, is_terminal, validate_transition};
