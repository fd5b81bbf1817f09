//! # burrowdb async open — runtime
//!
//! **Scheduler, cancellation, and cross-context result delivery for
//! burrowdb async opens.**
//!
//! The first open of a store in a process runs engine work (schema
//! validation, migration, asset copy, initial data) that must stay off the
//! origin context. This crate executes that work on a worker task and
//! marshals the outcome back:
//!
//! 1. the origin context creates a [`DeliveryQueue`] and submits an
//!    [`OpenRequest`](burrowdb_open::OpenRequest) through [`OpenRuntime::open_async`];
//! 2. a worker runs the initializer, racing it against the request's
//!    [`CancelToken`];
//! 3. the terminal outcome is posted to the queue, and draining the queue
//!    invokes the callback on the origin context — exactly once.
//!
//! ## Quick Start
//!
//! ```rust
//! use burrowdb_open::prelude::*;
//! use burrowdb_runtime::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (mut queue, origin) = DeliveryQueue::new();
//! let runtime = OpenRuntime::with_default_scheduler();
//!
//! let request = OpenRequest::with_initializer(
//!     ConfigKey::new("stores/app.burrow"),
//!     |_key| async { Ok::<_, OpenError>("handle".to_string()) },
//!     Box::new(CallbackFn::new(|handle: String| assert_eq!(handle, "handle"))),
//! );
//!
//! let task = runtime.open_async(request, origin).await.unwrap();
//! assert!(queue.deliver_next().await);
//! assert!(!task.is_cancelled());
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`scheduler`] — `OpenScheduler` trait: how open work is executed
//! - [`tokio_scheduler`] — default `TokioOpenScheduler` using `tokio::spawn`
//! - [`delivery`] — delivery queue carrying outcomes to the origin context
//! - [`cancellation`] — one-way, idempotent, best-effort cancel token
//! - [`task`] — caller-facing `AsyncOpenTask` handle
//! - [`runtime`] — `OpenRuntime` bridging bookkeeping and execution

pub mod cancellation;
pub mod config;
pub mod delivery;
pub mod error;
pub mod prelude;
pub mod runtime;
pub mod scheduler;
pub mod task;
pub mod tokio_scheduler;

// Re-exports for convenience
pub use cancellation::CancelToken;
pub use config::SchedulerConfig;
pub use delivery::{Delivery, DeliveryQueue, OriginHandle};
pub use error::SchedulerError;
pub use runtime::OpenRuntime;
pub use scheduler::OpenScheduler;
pub use task::AsyncOpenTask;
pub use tokio_scheduler::TokioOpenScheduler;
