//! Error types for synthesis
//!
//! Provides the failure taxonomy of the pipeline:
//! - Oracle transport and quota failures (retryable, backed off)
//! - Extraction failures (no JSON object in the reply)
//! - Decode failures (JSON found but not a valid definition after repair)
//! - Modification failures (never replaced by a fallback object)

/// Failure of the text-generation oracle itself
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// Quota or rate limit exhausted
    #[error("quota exhausted: {0}")]
    Quota(String),

    /// Network, HTTP or provider failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// Reply carried no text
    #[error("empty response from model")]
    Empty,
}

impl OracleError {
    /// Create quota error
    #[inline]
    pub fn quota(message: impl Into<String>) -> Self {
        Self::Quota(message.into())
    }

    /// Create transport error
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Check if this is a quota/rate-limit condition
    #[inline]
    #[must_use]
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::Quota(_))
    }

    /// User-facing wording
    ///
    /// Only the wording depends on the variant; callers must not branch
    /// control flow on it.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.is_quota() {
            format!("AI service quota exceeded, try again later ({self})")
        } else {
            format!("AI service unavailable ({self})")
        }
    }
}

/// Request URLs are dropped so that no credential reaches user-facing text
impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        let quota = err.status().map(|s| s.as_u16()) == Some(429);
        let message = err.without_url().to_string();
        if quota {
            OracleError::Quota(message)
        } else {
            OracleError::Transport(message)
        }
    }
}

/// No parseable JSON object in the oracle reply
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no valid JSON object found in response")]
pub struct ExtractionError;

/// Synthesis failures
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    /// The request cannot be synthesized at all
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Oracle call failed after its retry budget
    #[error("oracle failed: {0}")]
    Oracle(#[from] OracleError),

    /// No JSON object found
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// JSON found but it does not decode into a definition
    #[error("invalid definition: {0}")]
    Decode(String),
}

impl SynthError {
    /// Whether the reply was received but had the wrong shape
    ///
    /// Schema failures degrade the directive prompt; oracle failures retry
    /// with the same one.
    #[inline]
    #[must_use]
    pub fn is_schema_failure(&self) -> bool {
        matches!(self, Self::Extraction(_) | Self::Decode(_))
    }
}

/// Modification pipeline failures
#[derive(Debug, thiserror::Error)]
pub enum ModifyError {
    /// Modification instruction was empty
    #[error("modification instruction is empty")]
    EmptyInstruction,

    /// Current definition could not be serialized into the prompt
    #[error("cannot serialize current definition: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Oracle or parse failure
    #[error("failed to modify definition: {0}")]
    Synthesis(#[from] SynthError),
}
