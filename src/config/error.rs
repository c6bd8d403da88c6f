//! Configuration error types.

use thiserror::Error;

use crate::classifier::ClassifierError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A variable was set but its value is unusable.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A model-list entry could not be turned into a classifier.
    #[error("invalid classifier list: {0}")]
    InvalidClassifier(#[from] ClassifierError),

    /// Both the image and the video model lists are empty.
    #[error("no classifiers configured: set TRUECHECK_IMAGE_MODELS or TRUECHECK_VIDEO_MODELS")]
    NoClassifiers,
}
