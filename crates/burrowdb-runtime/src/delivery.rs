//! Result delivery channel — marshals outcomes back to the origin context.
//!
//! Cross-context delivery is explicit message passing: workers post a
//! [`Delivery`] job onto the origin context's queue, and whoever drains the
//! queue runs the callback there. The callback moves into the job, so a
//! request cannot be delivered twice — there is nothing left to invoke.

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use burrowdb_open::{InstanceCallback, OpenOutcome};

/// One unit of delivery work: a terminal outcome plus the callback to run.
pub struct Delivery<H> {
    request_id: String,
    outcome: OpenOutcome<H>,
    callback: Box<dyn InstanceCallback<H>>,
}

impl<H> Delivery<H> {
    pub(crate) fn new(
        request_id: String,
        outcome: OpenOutcome<H>,
        callback: Box<dyn InstanceCallback<H>>,
    ) -> Self {
        Self {
            request_id,
            outcome,
            callback,
        }
    }

    /// Identifier of the open request this delivery belongs to.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Invoke the callback for this outcome.
    ///
    /// Consumes the job: `on_success` receives ownership of the handle,
    /// `on_error` receives the failure. Run this on the origin context.
    pub fn run(mut self) {
        match self.outcome {
            OpenOutcome::Success(handle) => self.callback.on_success(handle),
            OpenOutcome::Failure(error) => self.callback.on_error(error),
        }
    }
}

impl<H> fmt::Debug for Delivery<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            OpenOutcome::Success(_) => "success",
            OpenOutcome::Failure(_) => "failure",
        };
        f.debug_struct("Delivery")
            .field("request_id", &self.request_id)
            .field("outcome", &outcome)
            .finish_non_exhaustive()
    }
}

/// Worker-side sender half of the delivery channel.
pub struct OriginHandle<H> {
    tx: mpsc::UnboundedSender<Delivery<H>>,
}

impl<H> Clone for OriginHandle<H> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<H> OriginHandle<H> {
    /// Post a delivery to the origin context. Returns whether it was posted.
    ///
    /// If the origin context no longer exists (its queue was dropped), the
    /// job is disposed here instead: the callback never runs, and a
    /// `Success` handle is released by drop so the resource does not leak.
    pub fn post(&self, delivery: Delivery<H>) -> bool {
        match self.tx.send(delivery) {
            Ok(()) => true,
            Err(mpsc::error::SendError(delivery)) => {
                warn!(
                    request_id = %delivery.request_id,
                    "origin context gone; disposing undelivered outcome"
                );
                drop(delivery);
                false
            }
        }
    }
}

impl<H> fmt::Debug for OriginHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginHandle")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Origin-context side of the delivery channel.
///
/// Owned by the execution context that submits open requests. Dropping the
/// queue tears the channel down; later posts become disposals.
pub struct DeliveryQueue<H> {
    rx: mpsc::UnboundedReceiver<Delivery<H>>,
}

impl<H> DeliveryQueue<H> {
    /// Create a queue together with the handle workers post through.
    pub fn new() -> (Self, OriginHandle<H>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, OriginHandle { tx })
    }

    /// Receive the next delivery and run its callback.
    ///
    /// Returns `false` once every [`OriginHandle`] is gone and the queue is
    /// drained.
    pub async fn deliver_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(delivery) => {
                debug!(request_id = %delivery.request_id(), "running delivery on origin context");
                delivery.run();
                true
            }
            None => false,
        }
    }

    /// Run every delivery already queued, without waiting. Returns how many
    /// callbacks were invoked.
    pub fn deliver_pending(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(delivery) = self.rx.try_recv() {
            delivery.run();
            delivered += 1;
        }
        delivered
    }
}

impl<H> fmt::Debug for DeliveryQueue<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryQueue").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrowdb_open::{CallbackFn, OpenError};
    use std::panic::AssertUnwindSafe;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn success_delivery(
        id: &str,
        handle: u32,
        delivered: Arc<AtomicUsize>,
    ) -> Delivery<u32> {
        let callback = CallbackFn::new(move |_handle: u32| {
            delivered.fetch_add(1, Ordering::SeqCst);
        });
        Delivery::new(id.to_string(), OpenOutcome::Success(handle), Box::new(callback))
    }

    #[tokio::test]
    async fn test_deliver_next_runs_success_callback() {
        let (mut queue, origin) = DeliveryQueue::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        assert!(origin.post(success_delivery("req-1", 7, Arc::clone(&delivered))));
        assert!(queue.deliver_next().await);
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_with_default_callback_panics_on_drain() {
        let (mut queue, origin) = DeliveryQueue::new();
        let callback = CallbackFn::new(|_handle: u32| {});
        let delivery = Delivery::new(
            "req-2".to_string(),
            OpenOutcome::Failure(OpenError::Initialization("bad header".to_string())),
            Box::new(callback),
        );
        assert!(origin.post(delivery));

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| queue.deliver_pending()));
        let payload = result.unwrap_err();
        let message = payload.downcast_ref::<String>().unwrap();
        assert!(message.contains("bad header"));
    }

    #[tokio::test]
    async fn test_post_after_queue_drop_disposes_the_handle() {
        struct Tracked(Arc<AtomicBool>);
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let (queue, origin) = DeliveryQueue::<Tracked>::new();
        drop(queue);

        let released = Arc::new(AtomicBool::new(false));
        let invoked = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&invoked);
        let delivery = Delivery::new(
            "req-3".to_string(),
            OpenOutcome::Success(Tracked(Arc::clone(&released))),
            Box::new(CallbackFn::new(move |_handle: Tracked| {
                count.fetch_add(1, Ordering::SeqCst);
            })),
        );

        assert!(!origin.post(delivery));
        assert!(released.load(Ordering::SeqCst), "handle must be released on disposal");
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_deliver_pending_drains_everything_queued() {
        let (mut queue, origin) = DeliveryQueue::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        for i in 0..3 {
            origin.post(success_delivery(&format!("req-{i}"), i, Arc::clone(&delivered)));
        }
        assert_eq!(queue.deliver_pending(), 3);
        assert_eq!(delivered.load(Ordering::SeqCst), 3);
        assert_eq!(queue.deliver_pending(), 0);
    }
}
