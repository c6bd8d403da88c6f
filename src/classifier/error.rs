use std::time::Duration;

use thiserror::Error;

/// Failure of a single classifier call.
///
/// The aggregator swallows all of these; only [`ClassifierError::is_cold_start`] influences the
/// error reported when every classifier fails.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Connection, TLS or body-read failure.
    #[error("classifier '{model}' transport failure: {message}")]
    Transport { model: String, message: String },

    /// The call exceeded its timeout.
    #[error("classifier '{model}' timed out after {after:?}")]
    Timeout { model: String, after: Duration },

    /// HTTP 503: the model is still loading.
    #[error("classifier '{model}' is loading (HTTP 503)")]
    ColdStart { model: String },

    /// Any other non-success HTTP status.
    #[error("classifier '{model}' returned HTTP {status}")]
    UpstreamStatus { model: String, status: u16 },

    /// Body was not a non-empty array of `{label, score}`.
    #[error("classifier '{model}' returned a malformed response: {reason}")]
    MalformedResponse { model: String, reason: String },

    /// A model-list entry could not be turned into a descriptor.
    #[error("invalid classifier entry '{entry}': {reason}")]
    InvalidDescriptor { entry: String, reason: String },
}

impl ClassifierError {
    pub fn is_cold_start(&self) -> bool {
        matches!(self, ClassifierError::ColdStart { .. })
    }
}
