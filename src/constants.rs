//! Cross-cutting, shared constants.
//!
//! Defaults live here so that config, the aggregator and the gateway agree on them.

use std::time::Duration;

/// Successful classifier results collected before the aggregator stops querying.
pub const DEFAULT_RESULT_QUOTA: usize = 3;

pub const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(DEFAULT_CLASSIFIER_TIMEOUT_SECS);

/// A classifier score strictly above this is "high confidence".
pub const DEFAULT_HIGH_CONFIDENCE_THRESHOLD: f64 = 0.65;

/// Ambiguous labels fall back to the score; above this the label's lean wins.
pub const AMBIGUOUS_SCORE_CUTOFF: f64 = 0.5;

/// Largest decoded media payload accepted by the gateway (4 MiB).
pub const DEFAULT_MAX_MEDIA_BYTES: usize = 4 * 1024 * 1024;

pub const DEFAULT_INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Image classifiers, highest priority first.
pub const DEFAULT_IMAGE_MODELS: &[&str] = &[
    "umm-maybe/AI-image-detector",
    "Organika/sdxl-detector",
    "dima806/deepfake_vs_real_image_detection",
    "prithivMLmods/Deep-Fake-Detector-Model",
];

/// Video classifiers. Image classifiers are appended as fallback for video requests.
pub const DEFAULT_VIDEO_MODELS: &[&str] = &["dima806/deepfake_vs_real_video_detection"];

/// Suggested client wait when every failure was something other than a cold start.
pub const RETRY_AFTER_UNAVAILABLE_SECS: u64 = 10;

/// Suggested client wait when at least one classifier reported it is still loading.
pub const RETRY_AFTER_COLD_START_SECS: u64 = 20;

pub const TRUECHECK_STATUS_HEADER: &str = "x-truecheck-status";
