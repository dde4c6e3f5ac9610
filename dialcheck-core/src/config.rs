//! Configuration types for dialcheck

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{DialcheckError, Result};

/// Default chat-completions gateway
pub const DEFAULT_BASE_URL: &str = "https://ai.gateway.lovable.dev/v1";

/// Default model replayed scenarios are sent to
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

/// Environment variables checked, in order, when no API key is configured
pub const API_KEY_ENV_VARS: [&str; 2] = ["DIALCHECK_API_KEY", "LOVABLE_API_KEY"];

/// Main configuration for a dialcheck run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DialcheckConfig {
    /// LLM backend configuration
    pub llm: LLMProviderConfig,

    /// Harness scoring and aggregation configuration
    pub harness: HarnessConfig,

    /// Replacement outcome catalog (TOML); the built-in table is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

/// LLM backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMProviderConfig {
    /// Model name
    pub model: String,

    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,

    /// API key (prefer env vars)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sampling temperature (0.0-2.0)
    pub temperature: f32,

    /// Maximum tokens to generate per reply
    pub max_tokens: usize,
}

impl Default for LLMProviderConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

impl LLMProviderConfig {
    /// Resolve the backend credential.
    ///
    /// Uses `api_key` when set, then the first non-empty variable from
    /// [`API_KEY_ENV_VARS`].
    ///
    /// # Errors
    ///
    /// Returns `DialcheckError::Configuration` when no credential is available.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }

        API_KEY_ENV_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
            .ok_or_else(|| {
                DialcheckError::Configuration(format!(
                    "no API key configured (set llm.api_key or one of {})",
                    API_KEY_ENV_VARS.join(", ")
                ))
            })
    }
}

/// Harness scoring and aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Fraction of expected outcomes that must be met for a scenario to pass
    /// when some are missed
    pub success_ratio: f64,

    /// Per-call timeout for the backend; no timeout when unset
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub call_timeout: Option<Duration>,

    /// Outcomes counted as a handoff (escalation or callback)
    pub handoff_outcomes: Vec<String>,

    /// Number of notable failures and example transcripts kept in a summary
    pub sample_size: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            success_ratio: 0.5,
            call_timeout: None,
            handoff_outcomes: vec![
                "escalation_offered".to_string(),
                "callback_offered".to_string(),
            ],
            sample_size: 3,
        }
    }
}

impl HarnessConfig {
    pub fn with_success_ratio(mut self, ratio: f64) -> Self {
        self.success_ratio = ratio;
        self
    }

    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.success_ratio) {
            return Err(DialcheckError::Configuration(format!(
                "harness.success_ratio must be within 0.0..=1.0, got {}",
                self.success_ratio
            )));
        }
        if self.sample_size == 0 {
            return Err(DialcheckError::Configuration(
                "harness.sample_size must be at least 1".to_string(),
            ));
        }
        if self.call_timeout.is_some_and(|t| t.is_zero()) {
            return Err(DialcheckError::Configuration(
                "harness.call_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl DialcheckConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. `dialcheck.toml` in the working directory
    /// 3. File named by `DIALCHECK_CONFIG_PATH`
    /// 4. `DIALCHECK_`-prefixed environment variables, nested with `__`
    ///    (e.g. `DIALCHECK_LLM__MODEL`)
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is invalid or a value fails validation.
    pub fn load() -> Result<Self> {
        Self::load_with(None::<&Path>)
    }

    /// Like [`DialcheckConfig::load`], with an extra file merged after
    /// `DIALCHECK_CONFIG_PATH` and before the environment.
    pub fn load_with(path: Option<impl AsRef<Path>>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Toml},
        };

        let mut figment = Figment::new().merge(Toml::file("dialcheck.toml"));

        if let Ok(env_path) = std::env::var("DIALCHECK_CONFIG_PATH") {
            figment = figment.merge(Toml::file(env_path));
        }
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path.as_ref()));
        }

        let config: DialcheckConfig = figment
            .merge(Env::prefixed("DIALCHECK_").split("__"))
            .extract()
            .map_err(|e| {
                DialcheckError::Configuration(format!("Failed to load configuration: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path only.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Toml},
        };

        let path = path.as_ref();
        if !path.exists() {
            return Err(DialcheckError::Configuration(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let config: DialcheckConfig = Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                DialcheckError::Configuration(format!(
                    "Failed to load configuration file: {}",
                    e
                ))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `DialcheckError::Configuration` describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(DialcheckError::Configuration(
                "llm.model must not be empty".to_string(),
            ));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(DialcheckError::Configuration(
                "llm.base_url must not be empty".to_string(),
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(DialcheckError::Configuration(
                "llm.max_tokens must be at least 1".to_string(),
            ));
        }
        self.harness.validate()
    }
}
