//! Oracle abstraction and the retrying client around it
//!
//! The oracle is a black box `generate(prompt) -> text`. Everything the
//! pipeline knows about resilience lives in [`OracleClient`]: pacing through
//! the shared [`RequestStore`] and exponential backoff between attempts of
//! the same logical call.

use crate::error::OracleError;
use crate::store::RequestStore;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Text-generation oracle
///
/// Implementations must be object safe and shareable across sessions.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Generate text for an assembled prompt
    async fn generate(&self, prompt: &str) -> Result<String, OracleError>;
}

#[async_trait]
impl<T: Oracle + ?Sized> Oracle for Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        (**self).generate(prompt).await
    }
}

/// Retry budget and backoff for one logical oracle call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each later one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy without delays
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay after the failed attempt with zero-based index `attempt`
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Oracle plus retry policy plus shared pacing
#[derive(Clone)]
pub struct OracleClient {
    oracle: Arc<dyn Oracle>,
    retry: RetryPolicy,
    store: Arc<RequestStore>,
}

impl std::fmt::Debug for OracleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleClient")
            .field("retry", &self.retry)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl OracleClient {
    /// Create client
    #[must_use]
    pub fn new(oracle: Arc<dyn Oracle>, retry: RetryPolicy, store: Arc<RequestStore>) -> Self {
        Self {
            oracle,
            retry,
            store,
        }
    }

    /// Shared request store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<RequestStore> {
        &self.store
    }

    /// Retry policy
    #[inline]
    #[must_use]
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Call the oracle, retrying failures with exponential backoff
    ///
    /// An empty reply counts as a failed attempt.
    ///
    /// # Errors
    /// The last [`OracleError`] once the retry budget is spent.
    pub async fn call(&self, prompt: &str) -> Result<String, OracleError> {
        let attempts = self.retry.max_attempts.max(1);
        let mut last_error = OracleError::Empty;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.retry.delay_after(attempt - 1);
                tracing::debug!(attempt, delay_ms = delay.as_millis(), "retrying oracle call");
                tokio::time::sleep(delay).await;
            }

            self.store.pace().await;

            match self.oracle.generate(prompt).await {
                Ok(text) if !text.trim().is_empty() => return Ok(text),
                Ok(_) => last_error = OracleError::Empty,
                Err(e) => last_error = e,
            }
            tracing::warn!(attempt = attempt + 1, error = %last_error, "oracle call failed");
        }

        Err(last_error)
    }
}
