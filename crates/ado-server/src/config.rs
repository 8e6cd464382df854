//! Server configuration
//!
//! Loaded from an optional TOML file; every field has a default. The
//! oracle API key falls back to the `GOOGLE_API_KEY` environment variable.
//!
//! ```toml
//! bind = "127.0.0.1:8000"
//! log_json = false
//!
//! [oracle]
//! model = "gemini-2.5-flash"
//! temperature = 0.7
//!
//! [synthesis]
//! max_attempts = 3
//! base_delay_ms = 1000
//!
//! [streaming]
//! chunk_size = 100
//! chunk_delay_ms = 50
//!
//! [store]
//! cache_capacity = 256
//! cache_ttl_secs = 3600
//! min_request_interval_ms = 1000
//! ```

use crate::error::ConfigError;
use crate::session::StreamingConfig;
use ado_synth::{GeminiSettings, RetryPolicy, StoreConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Complete server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Oracle client
    pub oracle: OracleSection,
    /// Synthesis ladder and retries
    pub synthesis: SynthesisSection,
    /// Content streaming
    pub streaming: StreamingSection,
    /// Request cache and pacing
    pub store: StoreSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            log_json: false,
            oracle: OracleSection::default(),
            synthesis: SynthesisSection::default(),
            streaming: StreamingSection::default(),
            store: StoreSection::default(),
        }
    }
}

/// `[oracle]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSection {
    /// API key; empty means "read the environment"
    pub api_key: String,
    /// Model name
    pub model: String,
    /// API base URL
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling mass
    pub top_p: f32,
    /// Output token cap
    pub max_output_tokens: u32,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OracleSection {
    fn default() -> Self {
        let settings = GeminiSettings::default();
        Self {
            api_key: settings.api_key,
            model: settings.model,
            base_url: settings.base_url,
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_output_tokens: settings.max_output_tokens,
            timeout_secs: settings.timeout.as_secs(),
        }
    }
}

/// `[synthesis]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisSection {
    /// Attempt budget, shared by the ladder and each oracle call
    pub max_attempts: u32,
    /// Backoff before the second oracle attempt, doubled afterwards
    pub base_delay_ms: u64,
}

impl Default for SynthesisSection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

/// `[streaming]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingSection {
    /// Characters per chunk
    pub chunk_size: usize,
    /// Pause after each chunk
    pub chunk_delay_ms: u64,
}

impl Default for StreamingSection {
    fn default() -> Self {
        Self {
            chunk_size: 100,
            chunk_delay_ms: 50,
        }
    }
}

/// `[store]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Maximum cached definitions
    pub cache_capacity: u64,
    /// Cached definition lifetime
    pub cache_ttl_secs: u64,
    /// Minimum spacing between oracle calls
    pub min_request_interval_ms: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            cache_capacity: 256,
            cache_ttl_secs: 3600,
            min_request_interval_ms: 1000,
        }
    }
}

impl ServerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on invalid TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from an optional file
    ///
    /// # Errors
    /// [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&text)
    }

    /// With listen address
    #[inline]
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// With API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.oracle.api_key = key.into();
        self
    }

    /// API key from the file, else from the environment
    ///
    /// # Errors
    /// [`ConfigError::MissingApiKey`] when neither provides one.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        if !self.oracle.api_key.trim().is_empty() {
            return Ok(self.oracle.api_key.clone());
        }
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey(API_KEY_ENV))
    }

    /// Gemini client settings
    ///
    /// # Errors
    /// [`ConfigError::MissingApiKey`] when no key is available.
    pub fn gemini_settings(&self) -> Result<GeminiSettings, ConfigError> {
        Ok(GeminiSettings {
            api_key: self.api_key()?,
            model: self.oracle.model.clone(),
            base_url: self.oracle.base_url.clone(),
            temperature: self.oracle.temperature,
            top_p: self.oracle.top_p,
            max_output_tokens: self.oracle.max_output_tokens,
            timeout: Duration::from_secs(self.oracle.timeout_secs),
        })
    }

    /// Retry policy of each oracle call
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.synthesis.max_attempts.max(1),
            base_delay: Duration::from_millis(self.synthesis.base_delay_ms),
        }
    }

    /// Request store settings
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            cache_capacity: self.store.cache_capacity,
            cache_ttl: Duration::from_secs(self.store.cache_ttl_secs),
            min_interval: Duration::from_millis(self.store.min_request_interval_ms),
        }
    }

    /// Streaming settings
    #[must_use]
    pub fn streaming_config(&self) -> StreamingConfig {
        StreamingConfig {
            chunk_size: self.streaming.chunk_size.max(1),
            chunk_delay: Duration::from_millis(self.streaming.chunk_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind.port(), 8000);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.streaming_config(), StreamingConfig::default());
        assert_eq!(config.store_config().min_interval, Duration::from_secs(1));
        assert_eq!(config.oracle.model, "gemini-2.5-flash");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
            bind = "0.0.0.0:9000"

            [streaming]
            chunk_delay_ms = 0

            [oracle]
            api_key = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.streaming.chunk_size, 100);
        assert!(config.streaming_config().chunk_delay.is_zero());
        assert_eq!(config.api_key().unwrap(), "abc");
        assert_eq!(config.synthesis.max_attempts, 3);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(matches!(
            ServerConfig::from_toml_str("bind = 12"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ServerConfig::load(Some(Path::new("/nonexistent/ado.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(ServerConfig::load(None).is_ok());
    }

    #[test]
    fn explicit_key_wins() {
        let config = ServerConfig::new().with_api_key("k");
        assert_eq!(config.gemini_settings().unwrap().api_key, "k");
    }
}
