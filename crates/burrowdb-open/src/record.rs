//! Bookkeeping model for submitted open requests.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::request::ConfigKey;
use crate::state::OpenPhase;

/// Serializable bookkeeping model for one open request.
///
/// Contains only serializable fields — runtime state (cancellation token,
/// phase watch, the callback itself) is managed by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRecord {
    /// Unique request identifier (UUID v7 for temporal ordering).
    pub request_id: String,
    /// Configuration identity the request is bound to.
    pub config: ConfigKey,
    /// Current lifecycle phase.
    pub phase: OpenPhase,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RFC 3339 time of the last phase change.
    pub last_updated_at: String,
}

impl OpenRecord {
    /// Create a fresh `Pending` record for `config` with a new request id.
    pub fn new(config: ConfigKey) -> Self {
        let now = Self::now_rfc3339();
        Self {
            request_id: Self::generate_request_id(),
            config,
            phase: OpenPhase::Pending,
            created_at: now.clone(),
            last_updated_at: now,
        }
    }

    /// Generate a new request id (UUID v7, temporally ordered).
    pub fn generate_request_id() -> String {
        Uuid::now_v7().to_string()
    }

    /// Record a phase change and bump the update timestamp.
    ///
    /// Transition validity is the caller's concern — see
    /// [`validate_transition`](crate::state::validate_transition).
    pub fn set_phase(&mut self, phase: OpenPhase) {
        self.phase = phase;
        self.last_updated_at = Self::now_rfc3339();
    }

    fn now_rfc3339() -> String {
        Utc::now().to_rfc3339()
    }
}
