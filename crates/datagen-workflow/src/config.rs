//! Run configuration.
//!
//! The simulator receives these values already parsed; it does no CLI or
//! file handling of its own.

use crate::error::ConfigurationError;
use crate::sink::DEFAULT_FLUSH_THRESHOLD;
use std::time::Duration;

/// Default number of products sampled per session.
pub const DEFAULT_PRODUCT_SAMPLE_SIZE: usize = 10;

/// Default collection (table) events are written to.
pub const DEFAULT_EVENT_COLLECTION: &str = "event";

/// What a session does when one of its walks fails in a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkFailurePolicy {
    /// Record the failed walk and start the next repetition.
    #[default]
    Continue,
    /// Stop the session and report it as failed.
    AbortSession,
}

/// Parameters for a simulation run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of sessions launched over the whole run.
    pub total_sessions: u64,
    /// Upper bound on sessions holding a token at the same time.
    pub max_concurrent_sessions: usize,
    /// Walks each session performs with its identity and product sample.
    pub walks_per_session: u32,
    /// Buffered events that trigger a flush.
    pub flush_threshold: usize,
    /// Products sampled per session.
    pub product_sample_size: usize,
    /// Upper bound of the random delay between two steps of a walk. `None` disables pacing.
    pub max_pacing: Option<Duration>,
    /// Base seed; every session derives its own RNG from it.
    pub seed: u64,
    pub walk_failure_policy: WalkFailurePolicy,
    pub event_collection: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            total_sessions: 10,
            max_concurrent_sessions: 4,
            walks_per_session: 3,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            product_sample_size: DEFAULT_PRODUCT_SAMPLE_SIZE,
            max_pacing: None,
            seed: 42,
            walk_failure_policy: WalkFailurePolicy::default(),
            event_collection: DEFAULT_EVENT_COLLECTION.to_string(),
        }
    }
}

impl RunConfig {
    /// Check the settings that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_concurrent_sessions == 0 {
            return Err(ConfigurationError::InvalidSetting {
                name: "max_concurrent_sessions",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.flush_threshold == 0 {
            return Err(ConfigurationError::InvalidSetting {
                name: "flush_threshold",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.product_sample_size == 0 {
            return Err(ConfigurationError::InvalidSetting {
                name: "product_sample_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.event_collection.trim().is_empty() {
            return Err(ConfigurationError::InvalidSetting {
                name: "event_collection",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Seed for the RNG of session `session_id`.
    ///
    /// Lets any session be replayed on its own without generating the ones before it.
    pub fn session_seed(&self, session_id: u64) -> u64 {
        self.seed
            .wrapping_add(session_id.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}
