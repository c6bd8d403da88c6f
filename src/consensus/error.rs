use thiserror::Error;

use crate::constants::{RETRY_AFTER_COLD_START_SECS, RETRY_AFTER_UNAVAILABLE_SECS};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// Not a single classifier produced a usable result.
    #[error("no classifiers available after {attempted} attempts (cold start: {cold_start})")]
    NoClassifiersAvailable {
        attempted: usize,
        /// At least one classifier answered HTTP 503.
        cold_start: bool,
    },
}

impl ConsensusError {
    /// The caller may retry the whole request later.
    pub fn is_retryable(&self) -> bool {
        match self {
            ConsensusError::NoClassifiersAvailable { .. } => true,
        }
    }

    pub fn retry_after_secs(&self) -> u64 {
        match self {
            ConsensusError::NoClassifiersAvailable { cold_start: true, .. } => {
                RETRY_AFTER_COLD_START_SECS
            }
            ConsensusError::NoClassifiersAvailable { .. } => RETRY_AFTER_UNAVAILABLE_SECS,
        }
    }

    /// Human-readable wait suggestion.
    pub fn wait_hint(&self) -> String {
        match self {
            ConsensusError::NoClassifiersAvailable { cold_start: true, .. } => format!(
                "AI models are loading. Please try again in {} seconds.",
                self.retry_after_secs()
            ),
            ConsensusError::NoClassifiersAvailable { .. } => format!(
                "Detection services are temporarily unavailable. Please try again in {} seconds.",
                self.retry_after_secs()
            ),
        }
    }
}
