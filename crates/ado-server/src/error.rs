//! Error types for sessions and configuration

use std::path::PathBuf;

/// Session-level failures
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The client went away; no further sends are attempted
    #[error("client disconnected")]
    Disconnected,

    /// An outbound event could not be encoded
    #[error("cannot encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SessionError {
    /// Whether the channel is gone
    #[inline]
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for the config shape
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// No API key in the file or the environment
    #[error("no oracle API key configured (set oracle.api_key or {0})")]
    MissingApiKey(&'static str),

    /// The oracle client could not be built
    #[error("cannot build oracle client: {0}")]
    Oracle(#[from] ado_synth::OracleError),
}
