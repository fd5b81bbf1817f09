//! Open scheduler — abstraction for how open work is executed.
//!
//! Separates *how opens run* from the protocol data model.
//! Default: [`TokioOpenScheduler`](crate::tokio_scheduler::TokioOpenScheduler)
//! (in-process async). The seam exists so an embedder with its own thread
//! model can supply a different worker strategy.

use async_trait::async_trait;
use tokio::sync::watch;

use burrowdb_open::{OpenPhase, OpenRequest};

use crate::delivery::OriginHandle;
use crate::error::SchedulerError;
use crate::task::AsyncOpenTask;

/// Trait for executing open requests and tracking their runtime lifecycle.
///
/// Registration and start are separate steps: a registered request holds
/// its work until `start` spawns the worker, which makes the
/// cancelled-before-execution path deterministic (register, cancel, start).
/// `submit`-style callers do both back to back.
#[async_trait]
pub trait OpenScheduler<H: Send + 'static>: Send + Sync {
    /// Register an open request under `request_id` without starting it.
    ///
    /// Returns the caller-facing task handle wrapping the cancellation
    /// token. The request is immutable from here on.
    async fn register(
        &self,
        request_id: &str,
        request: OpenRequest<H>,
        origin: OriginHandle<H>,
    ) -> Result<AsyncOpenTask, SchedulerError>;

    /// Start executing a registered request on a worker context.
    ///
    /// Returns the phase the request entered: [`OpenPhase::Running`] when a
    /// worker was spawned, or [`OpenPhase::Cancelled`] when the token was
    /// already set — in that case the initializer is never invoked and no
    /// delivery occurs.
    async fn start(&self, request_id: &str) -> Result<OpenPhase, SchedulerError>;

    /// Request cancellation of a tracked open. Returns `true` only when
    /// this call performed the `Active -> Cancelled` transition.
    ///
    /// Best-effort: a worker that already captured its outcome still
    /// delivers it.
    async fn cancel(&self, request_id: &str) -> Result<bool, SchedulerError>;

    /// Current phase of a tracked request, or `None` once it has finished
    /// and been cleaned up (or was never registered).
    async fn phase(&self, request_id: &str) -> Option<OpenPhase>;

    /// Subscribe to phase changes for a tracked request.
    ///
    /// The watch keeps the terminal phase readable even after the scheduler
    /// cleans the entry up. `None` if the request is not tracked.
    async fn subscribe(&self, request_id: &str) -> Option<watch::Receiver<OpenPhase>>;

    /// Block until a tracked request reaches a terminal phase.
    ///
    /// Returns `None` if the request is not tracked by this scheduler.
    async fn await_terminal(&self, request_id: &str) -> Option<OpenPhase>;
}
