//! Configuration management for the reasoning backend
//!
//! This module provides utilities for loading and validating configuration
//! from environment variables or in-memory maps. Credentials are always
//! injected from the environment; nothing secret lives in source.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::error::{ReasoningError, Result};
use crate::resilience::RetryConfig;

/// Default OpenAI-compatible endpoint (Gemini compatibility surface)
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Default generative model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;

    /// Whether a value is set for the key
    fn contains(&self, key: &str) -> bool;
}

/// Extension methods for configuration providers
///
/// The `_or` variants fall back to the default only when the key is absent;
/// a value that is present but does not parse is an error.
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an integer configuration value
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value.trim().parse::<i64>().map_err(|e| {
            ReasoningError::configuration(format!("Invalid integer for key {}: {}", key, e))
        })
    }

    /// Get a float configuration value
    fn get_float(&self, key: &str) -> Result<f64> {
        let value = self.get_string(key)?;
        value.trim().parse::<f64>().map_err(|e| {
            ReasoningError::configuration(format!("Invalid float for key {}: {}", key, e))
        })
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get an integer configuration value with a default
    fn get_int_or(&self, key: &str, default: i64) -> Result<i64> {
        if self.contains(key) {
            self.get_int(key)
        } else {
            Ok(default)
        }
    }

    /// Get a float configuration value with a default
    fn get_float_or(&self, key: &str, default: f64) -> Result<f64> {
        if self.contains(key) {
            self.get_float(key)
        } else {
            Ok(default)
        }
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,

    /// Optional namespace for variables (e.g., "BACKEND")
    namespace: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set a namespace for environment variables
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Format a configuration key as an environment variable
    pub(crate) fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        if let Some(ref namespace) = self.namespace {
            env_key.push_str(namespace);
            env_key.push('_');
        }

        env_key.push_str(
            &key.to_uppercase()
                .replace(|c: char| !c.is_ascii_alphanumeric(), "_"),
        );

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => ReasoningError::configuration(format!(
                "Environment variable not set: {}",
                env_key
            )),
            env::VarError::NotUnicode(_) => ReasoningError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }

    fn contains(&self, key: &str) -> bool {
        env::var_os(self.format_key(key)).is_some()
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values.get(key).cloned().ok_or_else(|| {
            ReasoningError::configuration(format!("Configuration key not found: {}", key))
        })
    }

    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// Global default configuration provider (`OIL_*` variables)
pub static DEFAULT_PROVIDER: Lazy<Arc<EnvConfigProvider>> =
    Lazy::new(|| Arc::new(EnvConfigProvider::new().with_prefix("OIL")));

/// Connection settings for the generative backend
#[derive(Clone)]
pub struct BackendConfig {
    /// API key, injected from the environment
    pub api_key: String,

    /// Base URL of the OpenAI-compatible API (no trailing slash)
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

// Hand-written so the key never ends up in logs.
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl BackendConfig {
    /// Load configuration from a config provider
    ///
    /// Reads `backend_api_key` (required), `backend_base_url`,
    /// `backend_model` and `backend_timeout_seconds`.
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let mut config = Self::endpoint_from_provider(provider)?;
        config.api_key = provider.get_string("backend_api_key")?;

        config.validate()?;
        Ok(config)
    }

    /// Load everything except the API key
    ///
    /// The key is taken when set but not required, so a caller can supply it
    /// by other means. Unparseable values are still errors.
    pub fn endpoint_from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let base_url = provider.get_string_or("backend_base_url", DEFAULT_BASE_URL);
        let model = provider.get_string_or("backend_model", DEFAULT_MODEL);
        let timeout_seconds =
            provider.get_int_or("backend_timeout_seconds", DEFAULT_TIMEOUT_SECONDS as i64)?;

        if timeout_seconds <= 0 {
            return Err(ReasoningError::configuration(
                "backend_timeout_seconds must be positive",
            ));
        }

        Ok(Self {
            api_key: provider.get_string("backend_api_key").unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout_seconds: timeout_seconds as u64,
        })
    }

    /// Load configuration from the `OIL_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&**DEFAULT_PROVIDER)
    }

    /// Validate this configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ReasoningError::configuration("Backend API key is required"));
        }

        if self.base_url.is_empty() {
            return Err(ReasoningError::configuration("Backend base URL is required"));
        }

        if self.model.is_empty() {
            return Err(ReasoningError::configuration("Backend model is required"));
        }

        Ok(())
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl RetryConfig {
    /// Load retry settings from a config provider
    ///
    /// Missing keys fall back to `RetryConfig::default()`, which disables
    /// retries entirely.
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = RetryConfig::default();

        let max_retries = provider.get_int_or("backend_max_retries", defaults.max_retries as i64)?;
        if max_retries < 0 {
            return Err(ReasoningError::configuration(
                "backend_max_retries must not be negative",
            ));
        }

        let initial_interval = interval_ms(provider, "backend_retry_initial_ms", defaults.initial_interval)?;
        let max_interval = interval_ms(provider, "backend_retry_max_ms", defaults.max_interval)?;

        let multiplier = provider.get_float_or("backend_retry_multiplier", defaults.multiplier)?;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ReasoningError::configuration(
                "backend_retry_multiplier must be at least 1.0",
            ));
        }

        Ok(Self {
            max_retries: max_retries as u32,
            initial_interval,
            max_interval,
            multiplier,
            ..defaults
        })
    }
}

fn interval_ms<P: ConfigProvider + ?Sized>(provider: &P, key: &str, default: Duration) -> Result<Duration> {
    let ms = provider.get_int_or(key, default.as_millis() as i64)?;
    if ms <= 0 {
        return Err(ReasoningError::configuration(format!("{} must be positive", key)));
    }
    Ok(Duration::from_millis(ms as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_formatting() {
        let provider = EnvConfigProvider::new()
            .with_prefix("OIL")
            .with_namespace("TEST");

        assert_eq!(provider.format_key("backend_api_key"), "OIL_TEST_BACKEND_API_KEY");
        assert_eq!(provider.format_key("base-url"), "OIL_TEST_BASE_URL");
    }

    #[test]
    fn test_backend_config_defaults() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("backend_api_key", "test-key");

        let config = BackendConfig::from_provider(&provider).unwrap();
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = BackendConfig {
            api_key: "super-secret".to_string(),
            ..BackendConfig::default()
        };

        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
