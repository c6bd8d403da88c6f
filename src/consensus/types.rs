use serde::{Deserialize, Serialize};

use crate::interpret::ClassifierVerdict;

/// Final binary verdict for one media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Real,
    Ai,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Real => "real",
            Verdict::Ai => "ai",
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self, Verdict::Ai)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classifier's normalized answer. Serializes as a `model_details` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResult {
    #[serde(rename = "model")]
    pub model_name: String,
    pub verdict: ClassifierVerdict,
    /// `round(score * 100)`.
    pub confidence: u8,
    pub label: String,
    #[serde(rename = "highConfidence")]
    pub high_confidence: bool,
}

/// Vote counts over a set of [`NormalizedResult`]s. `unknown` results are counted separately
/// and never vote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub ai_votes: usize,
    pub real_votes: usize,
    pub unknown: usize,
    pub high_confidence_ai: usize,
    pub high_confidence_real: usize,
}

impl VoteTally {
    pub fn from_results(results: &[NormalizedResult]) -> Self {
        results.iter().fold(Self::default(), |mut tally, r| {
            match r.verdict {
                ClassifierVerdict::Ai => {
                    tally.ai_votes += 1;
                    if r.high_confidence {
                        tally.high_confidence_ai += 1;
                    }
                }
                ClassifierVerdict::Real => {
                    tally.real_votes += 1;
                    if r.high_confidence {
                        tally.high_confidence_real += 1;
                    }
                }
                ClassifierVerdict::Unknown => tally.unknown += 1,
            }
            tally
        })
    }

    pub fn total(&self) -> usize {
        self.ai_votes + self.real_votes + self.unknown
    }
}

/// Aggregated result of one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusOutcome {
    pub verdict: Verdict,
    /// Mean classifier confidence, rounded.
    pub score: u8,
    pub model_details: Vec<NormalizedResult>,
    pub summary_text: String,
    /// Name of the [`VerdictPolicy`](super::VerdictPolicy) that decided `verdict`.
    pub policy: &'static str,
}

impl ConsensusOutcome {
    /// Model names that contributed, in priority order.
    pub fn model_names(&self) -> Vec<&str> {
        self.model_details
            .iter()
            .map(|d| d.model_name.as_str())
            .collect()
    }
}
