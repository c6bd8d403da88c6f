//! TrueCheck library crate (used by the server binary and integration tests).
//!
//! Fans a media upload out to a prioritized list of remote AI-detection classifiers, collects a
//! fixed number of successful answers, and reduces them to a single `ai`/`real` verdict.
//!
//! # Modules
//! - [`interpret`] - label/score to per-classifier verdict
//! - [`consensus`] - result collection, vote tallying, verdict policies
//! - [`classifier`] - classifier catalog and the HTTP transport
//! - [`annotate`] - decorative `platform`/`anomalies` fields
//! - [`gateway`] - Axum router, request decoding, error mapping
//! - [`config`] - `TRUECHECK_*` environment configuration
//!
//! ## Test/Mock Support
//! [`MockClassifierClient`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod annotate;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod consensus;
pub mod gateway;
pub mod interpret;

pub use annotate::{CosmeticAnnotator, Decoration, NoDecoration, RandomAnnotator};
#[cfg(any(test, feature = "mock"))]
pub use classifier::MockClassifierClient;
pub use classifier::{
    ClassifierCatalog, ClassifierClient, ClassifierDescriptor, ClassifierError,
    HttpClassifierClient, MediaKind, RawClassification,
};
pub use config::{Config, ConfigError};
pub use consensus::{
    ConsensusAggregator, ConsensusError, ConsensusOutcome, ConsensusSettings, NormalizedResult,
    PolicyKind, Verdict, VerdictPolicy, VoteTally,
};
pub use gateway::{HandlerState, create_router_with_state};
pub use interpret::{ClassifierVerdict, Interpretation, LabelInterpreter, confidence_percent};
