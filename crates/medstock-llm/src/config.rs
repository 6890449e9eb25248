//! Suggester configuration.
//!
//! Configuration is resolved once at startup and passed into
//! [`SubstituteSuggester`](crate::SubstituteSuggester). Nothing in this crate
//! reads the environment while handling a request.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const ENV_API_KEY: &str = "MEDSTOCK_LLM_API_KEY";
pub const ENV_BASE_URL: &str = "MEDSTOCK_LLM_BASE_URL";
pub const ENV_MODEL: &str = "MEDSTOCK_LLM_MODEL";
pub const ENV_ALLOWED_MODELS: &str = "MEDSTOCK_LLM_ALLOWED_MODELS";
pub const ENV_FALLBACK: &str = "MEDSTOCK_LLM_FALLBACK";
pub const ENV_TIMEOUT_SECS: &str = "MEDSTOCK_LLM_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing API key ({0} is not set)")]
    MissingApiKey(&'static str),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Settings for the substitute suggester.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuggesterConfig {
    /// Bearer token for the completion API
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub base_url: String,
    /// Model used when the caller does not ask for one
    pub default_model: String,
    /// Models a caller may request
    pub allowed_models: Vec<String>,
    /// Candidates used when the service fails transiently; `None` propagates the failure
    pub fallback_candidates: Option<Vec<String>>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SuggesterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            allowed_models: vec![DEFAULT_MODEL.to_string()],
            fallback_candidates: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SuggesterConfig {
    /// Resolve configuration from `MEDSTOCK_LLM_*` environment variables.
    ///
    /// Intended to be called once at process startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup(ENV_API_KEY)
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey(ENV_API_KEY))?;

        let base_url = lookup(ENV_BASE_URL).unwrap_or(defaults.base_url);
        let default_model = lookup(ENV_MODEL).unwrap_or(defaults.default_model);

        let allowed_models = match lookup(ENV_ALLOWED_MODELS) {
            Some(raw) => split_list(&raw),
            None => vec![default_model.clone()],
        };

        let fallback_candidates = lookup(ENV_FALLBACK).map(|raw| split_list(&raw));

        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS,
                    message: e.to_string(),
                })?,
            None => defaults.timeout_secs,
        };

        let config = Self {
            api_key,
            base_url,
            default_model,
            allowed_models,
            fallback_candidates,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey(ENV_API_KEY));
        }
        if self.default_model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: ENV_MODEL,
                message: "default model cannot be empty".into(),
            });
        }
        if !self.is_model_allowed(&self.default_model) {
            return Err(ConfigError::InvalidValue {
                key: ENV_ALLOWED_MODELS,
                message: format!("default model {} is not allow-listed", self.default_model),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_TIMEOUT_SECS,
                message: "timeout must be positive".into(),
            });
        }
        Ok(())
    }

    /// Whether `model` is allow-listed (exact match).
    pub fn is_model_allowed(&self, model: &str) -> bool {
        self.allowed_models.iter().any(|m| m == model)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
