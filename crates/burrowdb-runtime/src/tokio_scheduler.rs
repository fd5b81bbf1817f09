//! Tokio-based open scheduler — default in-process execution using `tokio::spawn`.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::debug;

use burrowdb_open::{
    BoxedInitializer, ConfigKey, InstanceCallback, OpenError, OpenOutcome, OpenPhase, OpenRequest,
    is_terminal,
};

use crate::cancellation::CancelToken;
use crate::config::SchedulerConfig;
use crate::delivery::{Delivery, OriginHandle};
use crate::error::SchedulerError;
use crate::scheduler::OpenScheduler;
use crate::task::AsyncOpenTask;

/// Work held by a registered request until `start` hands it to a worker.
struct OpenWork<H> {
    config: ConfigKey,
    initializer: BoxedInitializer<H>,
    callback: Box<dyn InstanceCallback<H>>,
    origin: OriginHandle<H>,
}

struct OpenEntry<H> {
    token: CancelToken,
    phase_tx: watch::Sender<OpenPhase>,
    // Taken exactly once, by `start`; the Mutex keeps the entry map Sync.
    work: Mutex<Option<OpenWork<H>>>,
}

/// In-process open scheduler using the Tokio runtime.
///
/// One worker task per request; the worker races the initializer against
/// the cancellation token and hands at most one outcome to the delivery
/// channel. Entries are cleaned up once the terminal phase is observable.
pub struct TokioOpenScheduler<H> {
    entries: Arc<RwLock<HashMap<String, OpenEntry<H>>>>,
    config: SchedulerConfig,
}

impl<H> TokioOpenScheduler<H> {
    /// Create a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create a scheduler with a custom configuration.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }
}

impl<H> Default for TokioOpenScheduler<H> {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[async_trait]
impl<H: Send + 'static> OpenScheduler<H> for TokioOpenScheduler<H> {
    async fn register(
        &self,
        request_id: &str,
        request: OpenRequest<H>,
        origin: OriginHandle<H>,
    ) -> Result<AsyncOpenTask, SchedulerError> {
        let mut entries = self.entries.write().await;

        if self.config.max_in_flight > 0 && entries.len() >= self.config.max_in_flight {
            return Err(SchedulerError::MaxInFlightReached(self.config.max_in_flight));
        }
        if entries.contains_key(request_id) {
            return Err(SchedulerError::DuplicateRequest(request_id.to_string()));
        }

        let (config, initializer, callback) = request.into_parts();
        let token = CancelToken::new();
        let (phase_tx, _) = watch::channel(OpenPhase::Pending);

        entries.insert(
            request_id.to_string(),
            OpenEntry {
                token: token.clone(),
                phase_tx,
                work: Mutex::new(Some(OpenWork {
                    config,
                    initializer,
                    callback,
                    origin,
                })),
            },
        );

        debug!(request_id = %request_id, "open request registered");
        Ok(AsyncOpenTask::new(request_id.to_string(), token))
    }

    async fn start(&self, request_id: &str) -> Result<OpenPhase, SchedulerError> {
        let (work, token, phase_tx) = {
            let entries = self.entries.read().await;
            let entry = entries
                .get(request_id)
                .ok_or_else(|| SchedulerError::RequestNotFound(request_id.to_string()))?;
            let work = entry
                .work
                .lock()
                .await
                .take()
                .ok_or_else(|| SchedulerError::AlreadyStarted(request_id.to_string()))?;
            (work, entry.token.clone(), entry.phase_tx.clone())
        };

        if token.is_cancelled() {
            // Cancellation observed before execution: the initializer is
            // skipped entirely and no delivery occurs.
            phase_tx.send_replace(OpenPhase::Cancelled);
            self.entries.write().await.remove(request_id);
            debug!(request_id = %request_id, "open cancelled before execution; initializer skipped");
            return Ok(OpenPhase::Cancelled);
        }

        phase_tx.send_replace(OpenPhase::Running);

        let entries = Arc::clone(&self.entries);
        let request_id_owned = request_id.to_string();
        tokio::spawn(async move {
            let OpenWork {
                config,
                initializer,
                callback,
                origin,
            } = work;

            // Panics from the initializer, at construction or poll time,
            // are captured as data on the worker context.
            let guarded =
                AssertUnwindSafe(async move { initializer(config).await }).catch_unwind();

            let outcome = tokio::select! {
                result = guarded => Some(match result {
                    Ok(Ok(handle)) => OpenOutcome::Success(handle),
                    Ok(Err(error)) => OpenOutcome::Failure(error),
                    Err(panic) => OpenOutcome::Failure(OpenError::InitializerPanic(
                        panic_message(panic),
                    )),
                }),
                _ = token.cancelled() => None,
            };

            let terminal = match outcome {
                Some(outcome) => {
                    let posted =
                        origin.post(Delivery::new(request_id_owned.clone(), outcome, callback));
                    debug!(request_id = %request_id_owned, posted, "outcome captured");
                    OpenPhase::Delivered
                }
                None => {
                    // Cancellation observed before outcome capture: the
                    // in-flight initializer is abandoned, no delivery is
                    // scheduled, and the callback is dropped uninvoked.
                    debug!(
                        request_id = %request_id_owned,
                        "cancellation observed before outcome capture; delivery suppressed"
                    );
                    drop(callback);
                    OpenPhase::Cancelled
                }
            };

            phase_tx.send_replace(terminal);
            // Let subscribers observe the terminal phase before cleanup.
            tokio::task::yield_now().await;
            entries.write().await.remove(&request_id_owned);

            debug!(request_id = %request_id_owned, phase = ?terminal, "open request finished");
        });

        Ok(OpenPhase::Running)
    }

    async fn cancel(&self, request_id: &str) -> Result<bool, SchedulerError> {
        let entries = self.entries.read().await;
        let entry = entries
            .get(request_id)
            .ok_or_else(|| SchedulerError::RequestNotFound(request_id.to_string()))?;
        Ok(entry.token.cancel())
    }

    async fn phase(&self, request_id: &str) -> Option<OpenPhase> {
        let entries = self.entries.read().await;
        entries.get(request_id).map(|entry| *entry.phase_tx.borrow())
    }

    async fn subscribe(&self, request_id: &str) -> Option<watch::Receiver<OpenPhase>> {
        let entries = self.entries.read().await;
        entries.get(request_id).map(|entry| entry.phase_tx.subscribe())
    }

    async fn await_terminal(&self, request_id: &str) -> Option<OpenPhase> {
        let mut rx = self.subscribe(request_id).await?;
        loop {
            let phase = *rx.borrow_and_update();
            if is_terminal(phase) {
                return Some(phase);
            }
            if rx.changed().await.is_err() {
                // Sender dropped at cleanup — the watch still holds the
                // terminal phase.
                let phase = *rx.borrow();
                return is_terminal(phase).then_some(phase);
            }
        }
    }
}
