//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use burrowdb_runtime::prelude::*;
//! ```

pub use crate::cancellation::CancelToken;
pub use crate::config::SchedulerConfig;
pub use crate::delivery::{Delivery, DeliveryQueue, OriginHandle};
pub use crate::error::SchedulerError;
pub use crate::runtime::OpenRuntime;
pub use crate::scheduler::OpenScheduler;
pub use crate::task::AsyncOpenTask;
pub use crate::tokio_scheduler::TokioOpenScheduler;
