//! Cancellation token — one-way, best-effort cancellation for async opens.
//!
//! The token is the only object mutated concurrently by the caller and the
//! scheduler, so its state is a single flag behind a `tokio::sync::watch`
//! channel. Cancellation is never retroactive: an outcome already handed to
//! the origin context is delivered regardless, and the caller still owns
//! (and must release) a handle delivered after `cancel()`.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared one-way cancellation flag: `Active -> Cancelled`.
///
/// Clone-friendly — the caller-facing [`AsyncOpenTask`](crate::task::AsyncOpenTask)
/// and the worker hold copies of the same token.
#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    /// Create a new token in the `Active` state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            state: Arc::new(tx),
        }
    }

    /// Request cancellation. Idempotent; may be called from any context.
    ///
    /// Returns `true` only for the call that performed the
    /// `Active -> Cancelled` transition.
    pub fn cancel(&self) -> bool {
        self.state.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        })
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Wait until cancellation is requested.
    ///
    /// Resolves immediately if the token is already cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in self, so wait_for cannot fail.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_token_is_active() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_sets_flag() {
        let token = CancelToken::new();
        assert!(token.cancel());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let token = CancelToken::new();
        assert!(token.cancel());
        assert!(!token.cancel());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_on_cancel() {
        let token = CancelToken::new();
        let clone = token.clone();

        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            clone.cancel();
        });

        tokio::time::timeout(std::time::Duration::from_secs(1), token.cancelled())
            .await
            .expect("cancelled() should resolve within timeout");
    }

    #[tokio::test]
    async fn test_cancelled_resolves_immediately_when_already_cancelled() {
        let token = CancelToken::new();
        token.cancel();

        tokio::time::timeout(std::time::Duration::from_millis(10), token.cancelled())
            .await
            .expect("cancelled() should resolve immediately when already cancelled");
    }
}
