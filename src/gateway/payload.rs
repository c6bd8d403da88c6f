use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::annotate::Decoration;
use crate::classifier::MediaKind;
use crate::consensus::{ConsensusOutcome, NormalizedResult, Verdict};
use crate::gateway::error::GatewayError;

const BYTES_PER_MIB: usize = 1024 * 1024;

/// Inbound body. Accepts both `{media, type}` and `{mediaBase64, mediaType}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(alias = "mediaBase64")]
    pub media: String,

    #[serde(rename = "type", alias = "mediaType")]
    pub media_type: String,
}

/// Validated upload: bare base64 (prefix stripped) plus its decoded size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMedia {
    pub kind: MediaKind,
    pub base64: String,
    pub decoded_len: usize,
}

/// Strips a `data:<mime>;base64,` prefix if present.
pub fn strip_data_url(media: &str) -> &str {
    let media = media.trim();
    if media.starts_with("data:") {
        media.split_once(',').map(|(_, b64)| b64).unwrap_or("")
    } else {
        media
    }
}

/// Parses the media type, strips the data-URL prefix, decodes, and enforces `max_bytes`.
pub fn decode_media(
    request: &AnalyzeRequest,
    max_bytes: usize,
) -> Result<DecodedMedia, GatewayError> {
    let kind: MediaKind = request
        .media_type
        .parse()
        .map_err(GatewayError::InvalidRequest)?;

    let base64 = strip_data_url(&request.media);
    if base64.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "media payload is empty".to_string(),
        ));
    }

    let decoded = STANDARD
        .decode(base64)
        .map_err(|e| GatewayError::InvalidRequest(format!("media is not valid base64: {e}")))?;

    if decoded.len() > max_bytes {
        return Err(GatewayError::PayloadTooLarge { max_bytes });
    }

    Ok(DecodedMedia {
        kind,
        base64: base64.to_string(),
        decoded_len: decoded.len(),
    })
}

/// `"4MB"` for whole mebibytes, otherwise `"<n> bytes"`.
pub fn describe_limit(max_bytes: usize) -> String {
    if max_bytes >= BYTES_PER_MIB && max_bytes.is_multiple_of(BYTES_PER_MIB) {
        format!("{}MB", max_bytes / BYTES_PER_MIB)
    } else {
        format!("{max_bytes} bytes")
    }
}

/// Largest request body the router accepts for a given decoded-media limit.
pub fn request_body_limit(max_media_bytes: usize) -> usize {
    max_media_bytes.div_ceil(3) * 4 + 64 * 1024
}

/// Outbound body for a successful analysis.
///
/// `platform` and `anomalies` are decorative and only present for `ai` verdicts.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub verdict: Verdict,
    pub score: u8,
    pub model_used: String,
    pub media_type: MediaKind,
    pub summary: String,
    pub policy: &'static str,
    pub model_details: Vec<NormalizedResult>,
    #[serde(flatten)]
    pub decoration: Option<Decoration>,
}

impl AnalyzeResponse {
    pub fn new(
        outcome: ConsensusOutcome,
        media_type: MediaKind,
        decoration: Option<Decoration>,
    ) -> Self {
        let model_used = format!("TrueCheck Consensus ({})", outcome.model_names().join(", "));
        Self {
            verdict: outcome.verdict,
            score: outcome.score,
            model_used,
            media_type,
            summary: outcome.summary_text,
            policy: outcome.policy,
            model_details: outcome.model_details,
            decoration,
        }
    }
}
