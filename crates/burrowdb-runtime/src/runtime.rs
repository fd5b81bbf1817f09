//! Open Runtime — bridges request bookkeeping with scheduler execution.
//!
//! [`OpenRuntime`] combines the serializable [`OpenRecord`] ledger with a
//! pluggable [`OpenScheduler`] that manages how open work is actually
//! executed and cancelled.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use burrowdb_open::{OpenPhase, OpenRecord, OpenRequest, is_terminal, validate_transition};

use crate::config::SchedulerConfig;
use crate::delivery::OriginHandle;
use crate::error::SchedulerError;
use crate::scheduler::OpenScheduler;
use crate::task::AsyncOpenTask;
use crate::tokio_scheduler::TokioOpenScheduler;

/// Bridges open-request bookkeeping with runtime execution.
///
/// Owns both:
/// - an [`OpenRecord`] ledger (serializable, no runtime handles)
/// - an [`OpenScheduler`] for running initializers and managing cancellation
///
/// Records are retained after their request finishes, so callers can audit
/// what was opened, when, and how it ended.
pub struct OpenRuntime<H: Send + 'static> {
    records: Arc<RwLock<HashMap<String, OpenRecord>>>,
    scheduler: Arc<dyn OpenScheduler<H>>,
}

impl<H: Send + 'static> OpenRuntime<H> {
    /// Create a runtime around the given scheduler.
    pub fn new(scheduler: Arc<dyn OpenScheduler<H>>) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            scheduler,
        }
    }

    /// Create a runtime with the default [`TokioOpenScheduler`].
    pub fn with_default_scheduler() -> Self {
        Self::new(Arc::new(TokioOpenScheduler::new()))
    }

    /// Create a runtime with a [`TokioOpenScheduler`] using `config`.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self::new(Arc::new(TokioOpenScheduler::with_config(config)))
    }

    /// Get a reference to the underlying scheduler.
    pub fn scheduler(&self) -> &dyn OpenScheduler<H> {
        self.scheduler.as_ref()
    }

    /// Submit an open request: record it, then start the worker.
    ///
    /// Never blocks on the initializer — that runs on a worker context; the
    /// outcome arrives through `origin`'s queue. The returned task is the
    /// caller's cancellation handle.
    pub async fn open_async(
        &self,
        request: OpenRequest<H>,
        origin: OriginHandle<H>,
    ) -> Result<AsyncOpenTask, SchedulerError> {
        let record = OpenRecord::new(request.config().clone());
        let request_id = record.request_id.clone();
        let config = record.config.clone();
        self.records
            .write()
            .await
            .insert(request_id.clone(), record);

        let task = match self.scheduler.register(&request_id, request, origin).await {
            Ok(task) => task,
            Err(err) => {
                self.records.write().await.remove(&request_id);
                return Err(err);
            }
        };

        // Subscribe between register and start: the entry cannot be cleaned
        // up before the worker exists, so the terminal phase is never missed.
        let phase_rx = self.scheduler.subscribe(&request_id).await;

        let started = self.scheduler.start(&request_id).await?;
        Self::apply_phase(&self.records, &request_id, started).await;

        if !is_terminal(started) {
            if let Some(mut rx) = phase_rx {
                let records = Arc::clone(&self.records);
                let observer_id = request_id.clone();
                tokio::spawn(async move {
                    let terminal = loop {
                        let phase = *rx.borrow_and_update();
                        if is_terminal(phase) {
                            break phase;
                        }
                        if rx.changed().await.is_err() {
                            break *rx.borrow();
                        }
                    };
                    Self::apply_phase(&records, &observer_id, terminal).await;
                });
            }
        }

        info!(request_id = %request_id, config = %config, "async open submitted");
        Ok(task)
    }

    /// Request cancellation of an in-flight open. Best-effort: an outcome
    /// already captured is still delivered, and the record then reports
    /// `Delivered`.
    pub async fn cancel(&self, request_id: &str) -> Result<bool, SchedulerError> {
        self.scheduler.cancel(request_id).await
    }

    /// Wait until an open tracked by the scheduler reaches a terminal
    /// phase. `None` if it is not (or no longer) tracked.
    pub async fn await_terminal(&self, request_id: &str) -> Option<OpenPhase> {
        self.scheduler.await_terminal(request_id).await
    }

    /// Fetch the bookkeeping record for a request.
    pub async fn record(&self, request_id: &str) -> Option<OpenRecord> {
        self.records.read().await.get(request_id).cloned()
    }

    /// Number of requests ever submitted through this runtime.
    pub async fn open_count(&self) -> usize {
        self.records.read().await.len()
    }

    async fn apply_phase(
        records: &Arc<RwLock<HashMap<String, OpenRecord>>>,
        request_id: &str,
        phase: OpenPhase,
    ) {
        let mut records = records.write().await;
        let Some(record) = records.get_mut(request_id) else {
            return;
        };
        if record.phase == phase {
            return;
        }
        match validate_transition(record.phase, phase) {
            Ok(()) => record.set_phase(phase),
            Err(err) => {
                debug!(request_id = %request_id, error = %err, "ignoring stale phase update");
            }
        }
    }
}

impl<H: Send + 'static> std::fmt::Debug for OpenRuntime<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRuntime").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::DeliveryQueue;
    use burrowdb_open::{CallbackFn, ConfigKey, OpenError};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn request(handle: u32, delivered: Arc<AtomicUsize>) -> OpenRequest<u32> {
        OpenRequest::with_initializer(
            ConfigKey::new("stores/app.burrow"),
            move |_key| async move { Ok::<_, OpenError>(handle) },
            Box::new(CallbackFn::new(move |_got: u32| {
                delivered.fetch_add(1, Ordering::SeqCst);
            })),
        )
    }

    #[tokio::test]
    async fn test_open_async_records_and_delivers() {
        let runtime = OpenRuntime::with_default_scheduler();
        let (mut queue, origin) = DeliveryQueue::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        let task = runtime
            .open_async(request(11, Arc::clone(&delivered)), origin)
            .await
            .unwrap();

        let record = runtime.record(task.request_id()).await.unwrap();
        assert_eq!(record.config.as_str(), "stores/app.burrow");

        assert!(queue.deliver_next().await);
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.open_count().await, 1);
    }

    #[tokio::test]
    async fn test_record_reaches_delivered_phase() {
        let runtime = OpenRuntime::with_default_scheduler();
        let (mut queue, origin) = DeliveryQueue::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        let task = runtime
            .open_async(request(5, Arc::clone(&delivered)), origin)
            .await
            .unwrap();
        assert!(queue.deliver_next().await);

        // The observer updates the ledger once the terminal phase lands.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        loop {
            let record = runtime.record(task.request_id()).await.unwrap();
            if record.phase == OpenPhase::Delivered {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "record stuck in {:?}",
                record.phase
            );
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_cancel_unknown_request_errors() {
        let runtime = OpenRuntime::<u32>::with_default_scheduler();
        assert!(matches!(
            runtime.cancel("nonexistent").await,
            Err(SchedulerError::RequestNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_max_in_flight_rolls_back_the_record() {
        let runtime = OpenRuntime::with_config(SchedulerConfig { max_in_flight: 1 });
        let (_queue, origin) = DeliveryQueue::new();

        // Park one open so the scheduler entry stays alive.
        let parked = OpenRequest::with_initializer(
            ConfigKey::new("stores/parked.burrow"),
            |_key| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, OpenError>(0u32)
            },
            Box::new(CallbackFn::new(|_handle: u32| {})),
        );
        runtime.open_async(parked, origin.clone()).await.unwrap();

        let delivered = Arc::new(AtomicUsize::new(0));
        let result = runtime
            .open_async(request(2, Arc::clone(&delivered)), origin)
            .await;
        assert!(matches!(result, Err(SchedulerError::MaxInFlightReached(1))));
        // The rejected request leaves no record behind.
        assert_eq!(runtime.open_count().await, 1);
    }
}
