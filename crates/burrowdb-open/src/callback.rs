//! Delivery contract for async open outcomes.

use crate::error::OpenError;

/// Receives the outcome of an asynchronous open on the origin context.
///
/// `on_success` must be provided; `on_error` has a default implementation
/// that re-raises the failure on the origin context, so initialization
/// errors stay loud unless the caller explicitly opts into handling them.
///
/// The callback is invoked at most once per request, and only for the
/// variant that actually occurred.
pub trait InstanceCallback<H>: Send {
    /// Deliver the opened store handle to the origin context.
    ///
    /// Ownership of the handle transfers here. The receiver is responsible
    /// for eventually releasing it — dropping the handle closes the store.
    /// This holds even when the request was cancelled after initialization
    /// had already completed.
    fn on_success(&mut self, handle: H);

    /// Deliver the failure that occurred while opening the store.
    ///
    /// The default implementation panics on the origin context, propagating
    /// the error as an uncaught failure. Override to handle it instead.
    fn on_error(&mut self, error: OpenError) {
        panic!("unhandled async open failure: {error}");
    }
}

/// Closure adapter for [`InstanceCallback`].
///
/// Wraps a success closure and an optional error closure; without the
/// latter it keeps the trait's propagate-by-default error behavior.
pub struct CallbackFn<H> {
    on_success: Box<dyn FnMut(H) + Send>,
    on_error: Option<Box<dyn FnMut(OpenError) + Send>>,
}

impl<H> CallbackFn<H> {
    /// Build a callback from a success closure.
    pub fn new(on_success: impl FnMut(H) + Send + 'static) -> Self {
        Self {
            on_success: Box::new(on_success),
            on_error: None,
        }
    }

    /// Attach an error closure, replacing the propagate-by-default behavior.
    pub fn with_error(mut self, on_error: impl FnMut(OpenError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }
}

impl<H: Send> InstanceCallback<H> for CallbackFn<H> {
    fn on_success(&mut self, handle: H) {
        (self.on_success)(handle);
    }

    fn on_error(&mut self, error: OpenError) {
        match self.on_error.as_mut() {
            Some(on_error) => on_error(error),
            None => panic!("unhandled async open failure: {error}"),
        }
    }
}

impl<H> std::fmt::Debug for CallbackFn<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackFn")
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
