//! Decorative annotations for `ai` verdicts.
//!
//! The `platform` guess and `anomalies` list shown to users are **not** detection signals. No
//! classifier produced them; they are picked at random from fixed vocabularies to make the
//! result readable. Keep them out of anything that needs to be reproducible.

use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::classifier::MediaKind;
use crate::consensus::ConsensusOutcome;

const IMAGE_PLATFORMS: &[&str] = &[
    "Midjourney",
    "DALL-E 3",
    "Stable Diffusion XL",
    "Adobe Firefly",
];

const VIDEO_PLATFORMS: &[&str] = &["Sora", "Runway Gen-3", "Pika", "Kling"];

const IMAGE_ANOMALIES: &[&str] = &[
    "Inconsistent lighting and shadows",
    "Unnatural skin texture",
    "Irregular background details",
    "Asymmetric facial features",
    "Distorted hands or fingers",
    "Repeating texture patterns",
];

const VIDEO_ANOMALIES: &[&str] = &[
    "Temporal flickering between frames",
    "Unnatural blinking patterns",
    "Lip movement out of sync with audio",
    "Warping around face boundaries",
    "Inconsistent motion blur",
];

pub const ANOMALIES_PER_RESULT: usize = 3;

/// Display-only extras attached to an `ai` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoration {
    pub platform: String,
    pub anomalies: Vec<String>,
}

/// Produces decorative fields for an outcome. Must not influence the verdict or score.
pub trait CosmeticAnnotator: Send + Sync {
    fn annotate(&self, media_kind: MediaKind, outcome: &ConsensusOutcome) -> Option<Decoration>;
}

/// Never decorates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDecoration;

impl CosmeticAnnotator for NoDecoration {
    fn annotate(&self, _media_kind: MediaKind, _outcome: &ConsensusOutcome) -> Option<Decoration> {
        None
    }
}

/// Random platform and anomaly picks for `ai` verdicts.
#[derive(Debug)]
pub struct RandomAnnotator {
    rng: Mutex<StdRng>,
}

impl Default for RandomAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomAnnotator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic picks, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl CosmeticAnnotator for RandomAnnotator {
    fn annotate(&self, media_kind: MediaKind, outcome: &ConsensusOutcome) -> Option<Decoration> {
        if !outcome.verdict.is_ai() {
            return None;
        }

        let (platforms, anomalies) = match media_kind {
            MediaKind::Image => (IMAGE_PLATFORMS, IMAGE_ANOMALIES),
            MediaKind::Video => (VIDEO_PLATFORMS, VIDEO_ANOMALIES),
        };

        let mut rng = self.rng.lock().ok()?;
        let platform = platforms.choose(&mut *rng)?.to_string();
        let anomalies = anomalies
            .choose_multiple(&mut *rng, ANOMALIES_PER_RESULT)
            .map(|a| a.to_string())
            .collect();

        Some(Decoration {
            platform,
            anomalies,
        })
    }
}
