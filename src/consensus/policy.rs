//! Pluggable rules that turn a [`VoteTally`] into a [`Verdict`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::interpret::ClassifierVerdict;

use super::types::{NormalizedResult, Verdict, VoteTally};

/// Decides the final verdict from the accumulated results.
///
/// Implementations must be deterministic: the same results always produce the same verdict.
pub trait VerdictPolicy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// `results` is in classifier priority order and never empty.
    fn decide(&self, tally: &VoteTally, results: &[NormalizedResult]) -> Verdict;
}

/// Default rule: a high-confidence AI vote backed by a majority wins, then a plain majority of
/// at least two AI votes, then high-confidence real votes, then `real`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceWeightedConsensus;

impl VerdictPolicy for ConfidenceWeightedConsensus {
    fn name(&self) -> &'static str {
        "consensus"
    }

    fn decide(&self, tally: &VoteTally, _results: &[NormalizedResult]) -> Verdict {
        let backed_majority = tally.high_confidence_ai > 0 && tally.ai_votes > tally.real_votes;
        let plain_majority = tally.ai_votes > tally.real_votes && tally.ai_votes >= 2;

        // A high-confidence real lead and the fallthrough both resolve to real.
        if backed_majority || plain_majority {
            Verdict::Ai
        } else {
            Verdict::Real
        }
    }
}

/// `ai` only with an AI majority that includes at least one high-confidence AI vote.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictMajority;

impl VerdictPolicy for StrictMajority {
    fn name(&self) -> &'static str {
        "strict-majority"
    }

    fn decide(&self, tally: &VoteTally, _results: &[NormalizedResult]) -> Verdict {
        if tally.ai_votes > tally.real_votes && tally.high_confidence_ai >= 1 {
            Verdict::Ai
        } else {
            Verdict::Real
        }
    }
}

/// No voting: the highest-priority classifier with a usable verdict decides.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl VerdictPolicy for FirstMatch {
    fn name(&self) -> &'static str {
        "first-match"
    }

    fn decide(&self, _tally: &VoteTally, results: &[NormalizedResult]) -> Verdict {
        results
            .iter()
            .find_map(|r| match r.verdict {
                ClassifierVerdict::Ai => Some(Verdict::Ai),
                ClassifierVerdict::Real => Some(Verdict::Real),
                ClassifierVerdict::Unknown => None,
            })
            .unwrap_or(Verdict::Real)
    }
}

/// Built-in policies selectable by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PolicyKind {
    #[default]
    Consensus,
    StrictMajority,
    FirstMatch,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Consensus => "consensus",
            PolicyKind::StrictMajority => "strict-majority",
            PolicyKind::FirstMatch => "first-match",
        }
    }

    pub fn build(&self) -> Arc<dyn VerdictPolicy> {
        match self {
            PolicyKind::Consensus => Arc::new(ConfidenceWeightedConsensus),
            PolicyKind::StrictMajority => Arc::new(StrictMajority),
            PolicyKind::FirstMatch => Arc::new(FirstMatch),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "consensus" => Ok(PolicyKind::Consensus),
            "strict-majority" => Ok(PolicyKind::StrictMajority),
            "first-match" => Ok(PolicyKind::FirstMatch),
            other => Err(format!(
                "unknown verdict policy '{other}' (expected consensus, strict-majority or first-match)"
            )),
        }
    }
}
