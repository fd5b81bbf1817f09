//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use burrowdb_open::prelude::*;
//! ```

pub use crate::callback::{CallbackFn, InstanceCallback};
pub use crate::error::{OpenError, OpenResult};
pub use crate::record::OpenRecord;
pub use crate::request::{BoxedInitializer, ConfigKey, OpenOutcome, OpenRequest};
pub use crate::state::{OpenPhase, StateError, is_terminal, validate_transition};
