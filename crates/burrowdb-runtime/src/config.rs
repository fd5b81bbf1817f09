//! Scheduler configuration.

/// Configuration for an open scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum number of open requests tracked at once (0 = unlimited).
    ///
    /// Submissions beyond the limit are rejected, not queued.
    pub max_in_flight: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { max_in_flight: 1024 }
    }
}
