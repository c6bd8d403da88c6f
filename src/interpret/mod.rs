//! Label interpretation.
//!
//! Classifiers do not share a label vocabulary: one says `"artificial"`, another `"FAKE"`,
//! another `"label_1"`. [`LabelInterpreter`] folds a single `(label, score)` pair into a
//! [`ClassifierVerdict`] using substring heuristics and a score tie-break.
//!
//! Ambiguous labels (both or neither vocabulary matched) lean `real` unless the score is above
//! [`AMBIGUOUS_SCORE_CUTOFF`] and the label carries a fake marker.


use serde::{Deserialize, Serialize};

use crate::constants::{AMBIGUOUS_SCORE_CUTOFF, DEFAULT_HIGH_CONFIDENCE_THRESHOLD};

const REAL_MARKERS: &[&str] = &["real", "authentic", "genuine"];
const FAKE_MARKERS: &[&str] = &["fake", "deepfake", "synthetic", "ai"];

/// Per-classifier verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierVerdict {
    Real,
    Ai,
    /// Score was outside `[0, 1]`; the result is reported but never votes.
    Unknown,
}

impl ClassifierVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierVerdict::Real => "real",
            ClassifierVerdict::Ai => "ai",
            ClassifierVerdict::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ClassifierVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict plus the high-confidence flag for one `(label, score)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interpretation {
    pub verdict: ClassifierVerdict,
    pub high_confidence: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelInterpreter {
    high_confidence_threshold: f64,
}

impl Default for LabelInterpreter {
    fn default() -> Self {
        Self {
            high_confidence_threshold: DEFAULT_HIGH_CONFIDENCE_THRESHOLD,
        }
    }
}

impl LabelInterpreter {
    pub fn new(high_confidence_threshold: f64) -> Self {
        Self {
            high_confidence_threshold,
        }
    }

    pub fn high_confidence_threshold(&self) -> f64 {
        self.high_confidence_threshold
    }

    pub fn interpret(&self, label: &str, score: f64) -> Interpretation {
        if !(0.0..=1.0).contains(&score) {
            return Interpretation {
                verdict: ClassifierVerdict::Unknown,
                high_confidence: false,
            };
        }

        let label = label.to_lowercase();
        let is_real = REAL_MARKERS.iter().any(|m| label.contains(m));
        let is_fake = FAKE_MARKERS.iter().any(|m| label.contains(m));

        let verdict = match (is_real, is_fake) {
            (true, false) => ClassifierVerdict::Real,
            (false, true) => ClassifierVerdict::Ai,
            _ if score > AMBIGUOUS_SCORE_CUTOFF && is_fake => ClassifierVerdict::Ai,
            _ => ClassifierVerdict::Real,
        };

        Interpretation {
            verdict,
            high_confidence: score > self.high_confidence_threshold,
        }
    }
}

/// `round(score * 100)`, clamped to `0..=100`.
pub fn confidence_percent(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}
