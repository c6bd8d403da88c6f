//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `TRUECHECK_*` environment variables.
//! The resulting [`Config`] is immutable and handed to the aggregator and gateway at startup.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::classifier::ClassifierCatalog;
use crate::consensus::{ConsensusSettings, PolicyKind};
use crate::constants::{
    DEFAULT_CLASSIFIER_TIMEOUT_SECS, DEFAULT_HIGH_CONFIDENCE_THRESHOLD, DEFAULT_IMAGE_MODELS,
    DEFAULT_INFERENCE_BASE_URL, DEFAULT_MAX_MEDIA_BYTES, DEFAULT_RESULT_QUOTA,
    DEFAULT_VIDEO_MODELS,
};

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `TRUECHECK_*` overrides on top of defaults.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port. Default: `8888`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Base URL bare model names resolve against.
    pub inference_base_url: String,

    /// Image classifier entries, highest priority first.
    pub image_models: Vec<String>,

    /// Video classifier entries, highest priority first.
    pub video_models: Vec<String>,

    /// Bearer credential sent to classifiers.
    pub api_token: Option<String>,

    /// Successful results collected per request. Default: `3`.
    pub result_quota: usize,

    /// Per-classifier call timeout. Default: 20s.
    pub classifier_timeout: Duration,

    /// Default: `0.65`.
    pub high_confidence_threshold: f64,

    pub verdict_policy: PolicyKind,

    /// Largest decoded upload. Default: 4 MiB.
    pub max_media_bytes: usize,

    /// Attach decorative `platform`/`anomalies` to `ai` responses. Default: `true`.
    pub decorate: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("inference_base_url", &self.inference_base_url)
            .field("image_models", &self.image_models)
            .field("video_models", &self.video_models)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("result_quota", &self.result_quota)
            .field("classifier_timeout", &self.classifier_timeout)
            .field("high_confidence_threshold", &self.high_confidence_threshold)
            .field("verdict_policy", &self.verdict_policy)
            .field("max_media_bytes", &self.max_media_bytes)
            .field("decorate", &self.decorate)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8888,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            inference_base_url: DEFAULT_INFERENCE_BASE_URL.to_string(),
            image_models: DEFAULT_IMAGE_MODELS.iter().map(|m| m.to_string()).collect(),
            video_models: DEFAULT_VIDEO_MODELS.iter().map(|m| m.to_string()).collect(),
            api_token: None,
            result_quota: DEFAULT_RESULT_QUOTA,
            classifier_timeout: Duration::from_secs(DEFAULT_CLASSIFIER_TIMEOUT_SECS),
            high_confidence_threshold: DEFAULT_HIGH_CONFIDENCE_THRESHOLD,
            verdict_policy: PolicyKind::default(),
            max_media_bytes: DEFAULT_MAX_MEDIA_BYTES,
            decorate: true,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "TRUECHECK_PORT";
    const ENV_BIND_ADDR: &'static str = "TRUECHECK_BIND_ADDR";
    const ENV_INFERENCE_BASE_URL: &'static str = "TRUECHECK_INFERENCE_BASE_URL";
    const ENV_IMAGE_MODELS: &'static str = "TRUECHECK_IMAGE_MODELS";
    const ENV_VIDEO_MODELS: &'static str = "TRUECHECK_VIDEO_MODELS";
    const ENV_API_TOKEN: &'static str = "TRUECHECK_API_TOKEN";
    const ENV_API_TOKEN_FALLBACK: &'static str = "HUGGINGFACE_API_KEY";
    const ENV_RESULT_QUOTA: &'static str = "TRUECHECK_RESULT_QUOTA";
    const ENV_CLASSIFIER_TIMEOUT_SECS: &'static str = "TRUECHECK_CLASSIFIER_TIMEOUT_SECS";
    const ENV_HIGH_CONFIDENCE_THRESHOLD: &'static str = "TRUECHECK_HIGH_CONFIDENCE_THRESHOLD";
    const ENV_VERDICT_POLICY: &'static str = "TRUECHECK_VERDICT_POLICY";
    const ENV_MAX_MEDIA_BYTES: &'static str = "TRUECHECK_MAX_MEDIA_BYTES";
    const ENV_DECORATE: &'static str = "TRUECHECK_DECORATE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let inference_base_url =
            Self::parse_string_from_env(Self::ENV_INFERENCE_BASE_URL, defaults.inference_base_url);
        let image_models = Self::parse_list_from_env(Self::ENV_IMAGE_MODELS, defaults.image_models);
        let video_models = Self::parse_list_from_env(Self::ENV_VIDEO_MODELS, defaults.video_models);
        let api_token = Self::parse_optional_string_from_env(Self::ENV_API_TOKEN)
            .or_else(|| Self::parse_optional_string_from_env(Self::ENV_API_TOKEN_FALLBACK));
        let result_quota = Self::parse_from_env(Self::ENV_RESULT_QUOTA, defaults.result_quota)?;
        let classifier_timeout = Duration::from_secs(Self::parse_from_env(
            Self::ENV_CLASSIFIER_TIMEOUT_SECS,
            defaults.classifier_timeout.as_secs(),
        )?);
        let high_confidence_threshold = Self::parse_from_env(
            Self::ENV_HIGH_CONFIDENCE_THRESHOLD,
            defaults.high_confidence_threshold,
        )?;
        let verdict_policy = Self::parse_from_env(Self::ENV_VERDICT_POLICY, defaults.verdict_policy)?;
        let max_media_bytes =
            Self::parse_from_env(Self::ENV_MAX_MEDIA_BYTES, defaults.max_media_bytes)?;
        let decorate = Self::parse_bool_from_env(Self::ENV_DECORATE, defaults.decorate)?;

        Ok(Self {
            port,
            bind_addr,
            inference_base_url,
            image_models,
            video_models,
            api_token,
            result_quota,
            classifier_timeout,
            high_confidence_threshold,
            verdict_policy,
            max_media_bytes,
            decorate,
        })
    }

    /// Validates numeric ranges and the classifier lists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.result_quota == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RESULT_QUOTA,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.classifier_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_CLASSIFIER_TIMEOUT_SECS,
                value: "0".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.high_confidence_threshold) {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_HIGH_CONFIDENCE_THRESHOLD,
                value: self.high_confidence_threshold.to_string(),
                reason: "must be between 0.0 and 1.0".to_string(),
            });
        }

        if self.max_media_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_MEDIA_BYTES,
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let catalog = self.classifier_catalog()?;
        if catalog.is_empty() {
            return Err(ConfigError::NoClassifiers);
        }

        Ok(())
    }

    /// Resolves the model lists into descriptors.
    pub fn classifier_catalog(&self) -> Result<ClassifierCatalog, ConfigError> {
        Ok(ClassifierCatalog::from_entries(
            &self.image_models,
            &self.video_models,
            &self.inference_base_url,
        )?)
    }

    pub fn consensus_settings(&self) -> ConsensusSettings {
        ConsensusSettings::default()
            .quota(self.result_quota)
            .timeout(self.classifier_timeout)
            .high_confidence_threshold(self.high_confidence_threshold)
            .policy(self.verdict_policy)
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        match self.bind_addr {
            IpAddr::V4(addr) => format!("{}:{}", addr, self.port),
            IpAddr::V6(addr) => format!("[{}]:{}", addr, self.port),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_list_from_env(var_name: &str, default: Vec<String>) -> Vec<String> {
        match env::var(var_name) {
            Ok(value) => split_entries(&value),
            Err(_) => default,
        }
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                name: var_name,
                reason: e.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    name: var_name,
                    value,
                    reason: "expected true or false".to_string(),
                }),
            },
            None => Ok(default),
        }
    }
}

/// Splits a comma-separated model list, dropping blank entries.
pub fn split_entries(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}
