//! Open request, configuration identity, and outcome types.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::callback::InstanceCallback;
use crate::error::OpenError;

/// Opaque configuration identity for a store.
///
/// The engine derives the key from the store configuration (path, name,
/// encryption settings); this layer only clones, compares, and displays it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigKey(String);

impl ConfigKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Boxed initializer — the engine-owned routine that performs schema
/// validation, migration, asset copy, and initial-data work before
/// producing a handle. Consumed as a black box; it runs exactly once, on a
/// worker context, never on the origin context.
pub type BoxedInitializer<H> = Box<
    dyn FnOnce(ConfigKey) -> Pin<Box<dyn Future<Output = Result<H, OpenError>> + Send>> + Send,
>;

/// Terminal outcome of one open request.
///
/// Exactly one variant is ever produced per request.
#[derive(Debug)]
pub enum OpenOutcome<H> {
    /// The initializer produced a handle; ownership moves to the callback.
    Success(H),
    /// The initializer failed; the error is replayed on the origin context.
    Failure(OpenError),
}

/// One submitted open request. Immutable once submitted.
///
/// Ties together the configuration identity, the engine initializer, and
/// the callback to notify on the origin context.
pub struct OpenRequest<H> {
    config: ConfigKey,
    initializer: BoxedInitializer<H>,
    callback: Box<dyn InstanceCallback<H>>,
}

impl<H> OpenRequest<H> {
    pub fn new(
        config: ConfigKey,
        initializer: BoxedInitializer<H>,
        callback: Box<dyn InstanceCallback<H>>,
    ) -> Self {
        Self {
            config,
            initializer,
            callback,
        }
    }

    /// Build a request from a plain async closure, boxing it into a
    /// [`BoxedInitializer`].
    pub fn with_initializer<F, Fut>(
        config: ConfigKey,
        initializer: F,
        callback: Box<dyn InstanceCallback<H>>,
    ) -> Self
    where
        F: FnOnce(ConfigKey) -> Fut + Send + 'static,
        Fut: Future<Output = Result<H, OpenError>> + Send + 'static,
    {
        let boxed: BoxedInitializer<H> = Box::new(move |key| Box::pin(initializer(key)));
        Self::new(config, boxed, callback)
    }

    pub fn config(&self) -> &ConfigKey {
        &self.config
    }

    /// Decompose the request for execution. Used by schedulers.
    pub fn into_parts(self) -> (ConfigKey, BoxedInitializer<H>, Box<dyn InstanceCallback<H>>) {
        (self.config, self.initializer, self.callback)
    }
}

impl<H> fmt::Debug for OpenRequest<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRequest")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::CallbackFn;

    #[test]
    fn test_config_key_display_and_eq() {
        let a = ConfigKey::new("stores/default.burrow");
        let b = ConfigKey::new("stores/default.burrow");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "stores/default.burrow");
    }

    #[tokio::test]
    async fn test_with_initializer_runs_the_closure() {
        let request = OpenRequest::with_initializer(
            ConfigKey::new("default"),
            |key| async move { Ok::<_, OpenError>(format!("opened:{key}")) },
            Box::new(CallbackFn::new(|_handle: String| {})),
        );
        assert_eq!(request.config().as_str(), "default");

        let (config, initializer, _callback) = request.into_parts();
        let handle = initializer(config).await.unwrap();
        assert_eq!(handle, "opened:default");
    }

    #[tokio::test]
    async fn test_initializer_error_is_carried_as_data() {
        let request = OpenRequest::with_initializer(
            ConfigKey::new("default"),
            |_key| async { Err::<(), _>(OpenError::Initialization("corrupt pages".to_string())) },
            Box::new(CallbackFn::new(|_handle: ()| {})),
        );
        let (config, initializer, _callback) = request.into_parts();
        let err = initializer(config).await.unwrap_err();
        assert!(err.to_string().contains("corrupt pages"));
    }
}
