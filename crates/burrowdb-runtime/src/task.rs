//! Caller-facing handle for an in-flight async open.

use crate::cancellation::CancelToken;

/// Handle returned when an open request is submitted.
///
/// Cancellation is best-effort: calling [`cancel`](AsyncOpenTask::cancel)
/// does not guarantee that delivery is stopped — initialization may already
/// be underway or complete. If `on_success` still fires after `cancel()`,
/// the delivered handle belongs to the callback and must be released there
/// (dropping it closes the store).
#[derive(Debug, Clone)]
pub struct AsyncOpenTask {
    request_id: String,
    token: CancelToken,
}

impl AsyncOpenTask {
    pub(crate) fn new(request_id: String, token: CancelToken) -> Self {
        Self { request_id, token }
    }

    /// Identifier of the underlying open request.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Request cancellation of the open. Idempotent; returns `true` only
    /// for the call that performed the transition.
    pub fn cancel(&self) -> bool {
        self.token.cancel()
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_exposes_request_id() {
        let task = AsyncOpenTask::new("req-1".to_string(), CancelToken::new());
        assert_eq!(task.request_id(), "req-1");
        assert!(!task.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_flows_through_to_token() {
        let token = CancelToken::new();
        let task = AsyncOpenTask::new("req-2".to_string(), token.clone());
        assert!(task.cancel());
        assert!(!task.cancel());
        assert!(token.is_cancelled());
    }
}
