//! Process-wide request store
//!
//! Built once at startup and shared by every handler:
//! - a `moka` cache of synthesized definitions keyed by a request hash
//! - the instant of the last oracle call, used for best-effort pacing
//!
//! Pacing is a throttle, not a contract. Only the read-modify-write of
//! the timestamp is guarded.

use ado_schema::{ApplicationDefinition, GenerationRequest};
use moka::future::Cache;
use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Store configuration
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Maximum cached definitions
    pub cache_capacity: u64,
    /// Time-to-live of a cached definition
    pub cache_ttl: Duration,
    /// Minimum spacing between oracle calls
    pub min_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 256,
            cache_ttl: Duration::from_secs(3600),
            min_interval: Duration::from_secs(1),
        }
    }
}

impl StoreConfig {
    /// Configuration without pacing, for tests and offline tools
    #[must_use]
    pub fn unthrottled() -> Self {
        Self {
            min_interval: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Hash of the request fields that determine a synthesized definition
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestKey([u8; 32]);

impl RequestKey {
    /// Compute key for a generation request
    #[must_use]
    pub fn for_request(request: &GenerationRequest) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(request.prompt.as_bytes());
        hasher.update(&[0]);
        hasher.update(request.framework.as_bytes());
        hasher.update(&[0]);
        hasher.update(request.style_framework.as_str().as_bytes());
        for requirement in &request.additional_requirements {
            hasher.update(&[0]);
            hasher.update(requirement.as_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestKey({})", self.short())
    }
}

/// Shared cache and pacing state
pub struct RequestStore {
    cache: Cache<RequestKey, ApplicationDefinition>,
    last_call: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl fmt::Debug for RequestStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestStore")
            .field("cached", &self.cache.entry_count())
            .field("min_interval", &self.min_interval)
            .finish()
    }
}

impl Default for RequestStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl RequestStore {
    /// Create store
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(config.cache_capacity)
                .time_to_live(config.cache_ttl)
                .build(),
            last_call: Mutex::new(None),
            min_interval: config.min_interval,
        }
    }

    /// Cached definition for a request
    pub async fn cached(&self, key: &RequestKey) -> Option<ApplicationDefinition> {
        self.cache.get(key).await
    }

    /// Remember a synthesized definition
    pub async fn remember(&self, key: RequestKey, ado: ApplicationDefinition) {
        self.cache.insert(key, ado).await;
    }

    /// Approximate number of cached definitions
    #[must_use]
    pub fn cached_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Reserve the next oracle-call slot and return how long to wait for it
    #[must_use]
    pub fn reserve_slot(&self) -> Duration {
        let now = Instant::now();
        let mut last = self.last_call.lock();
        let slot = match *last {
            Some(prev) if prev + self.min_interval > now => prev + self.min_interval,
            _ => now,
        };
        *last = Some(slot);
        slot - now
    }

    /// Wait until an oracle call is admitted
    pub async fn pace(&self) {
        let wait = self.reserve_slot();
        if !wait.is_zero() {
            tracing::debug!(wait_ms = wait.as_millis(), "pacing oracle call");
            tokio::time::sleep(wait).await;
        }
    }
}
