//! Multi-classifier consensus.
//!
//! [`ConsensusAggregator`] walks the classifier catalog in priority order, normalizes each
//! answer through the [`LabelInterpreter`](crate::interpret::LabelInterpreter), stops at the
//! result quota, and hands the accumulated [`NormalizedResult`]s to a [`VerdictPolicy`].
//!
//! Single-classifier failures are local: they are logged and skipped. Only a run with zero
//! usable results is reported, as the retryable [`ConsensusError::NoClassifiersAvailable`].
//!
//! # Policies
//!
//! | Name              | `ai` when                                                        |
//! |-------------------|------------------------------------------------------------------|
//! | `consensus`       | AI majority with a high-confidence AI vote, or ≥2 AI votes in majority |
//! | `strict-majority` | AI majority with a high-confidence AI vote                       |
//! | `first-match`     | the first usable result says `ai`                                |

pub mod aggregator;
pub mod error;
pub mod policy;
pub mod types;


pub use aggregator::{ConsensusAggregator, ConsensusSettings, reduce};
pub use error::ConsensusError;
pub use policy::{
    ConfidenceWeightedConsensus, FirstMatch, PolicyKind, StrictMajority, VerdictPolicy,
};
pub use types::{ConsensusOutcome, NormalizedResult, Verdict, VoteTally};
