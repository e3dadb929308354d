//! Builder for configuring counter instances

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use super::{Coalescer, Inner, TokenCounter};
use crate::Result;
use crate::cache::{CacheConfig, TtlCache};
use crate::client::{HttpPreciseClient, PreciseSource};

/// Default transport timeout for precise requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default trailing-edge debounce window for the precise path.
const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Default period of the background eviction sweep.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Builder for configuring [`TokenCounter`] instances.
pub struct TokenCounterBuilder {
    endpoint: Option<String>,
    source: Option<Arc<dyn PreciseSource>>,
    timeout: Duration,
    debounce_window: Duration,
    quick_cache: CacheConfig,
    precise_cache: CacheConfig,
    sweep_interval: Option<Duration>,
}

impl TokenCounterBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            source: None,
            timeout: DEFAULT_TIMEOUT,
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            quick_cache: CacheConfig::default(),
            precise_cache: CacheConfig::default(),
            sweep_interval: Some(DEFAULT_SWEEP_INTERVAL),
        }
    }

    /// Base URL of the precise-tokenization service.
    pub fn endpoint(mut self, base_url: impl Into<String>) -> Self {
        self.endpoint = Some(base_url.into());
        self
    }

    /// Use a custom precise source instead of the HTTP client.
    ///
    /// Takes precedence over [`endpoint()`](Self::endpoint).
    pub fn precise_source(mut self, source: Arc<dyn PreciseSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Transport timeout for precise requests (default 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Trailing-edge debounce window for the precise path (default 300 ms).
    pub fn debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Configure the quick cache tier (default 10,000 entries, 60 s TTL).
    pub fn quick_cache(mut self, config: CacheConfig) -> Self {
        self.quick_cache = config;
        self
    }

    /// Configure the precise cache tier (default 10,000 entries, 60 s TTL).
    pub fn precise_cache(mut self, config: CacheConfig) -> Self {
        self.precise_cache = config;
        self
    }

    /// Period of the background eviction sweep (default 5 minutes).
    pub fn sweep_interval(mut self, every: Duration) -> Self {
        self.sweep_interval = Some(every);
        self
    }

    /// Disable the background sweep. Expired entries still miss on read;
    /// only the periodic memory bounding is lost.
    pub fn disable_sweep(mut self) -> Self {
        self.sweep_interval = None;
        self
    }

    /// Build the counter.
    ///
    /// Fails only if the HTTP client cannot be constructed. Without an
    /// endpoint or custom source the counter runs quick-only: the precise
    /// path resolves with the heuristic instead of touching the network.
    pub fn build(self) -> Result<TokenCounter> {
        let source = match (self.source, self.endpoint) {
            (Some(source), _) => Some(source),
            (None, Some(base_url)) => {
                let client = HttpPreciseClient::with_timeout(base_url, self.timeout)?;
                Some(Arc::new(client) as Arc<dyn PreciseSource>)
            }
            (None, None) => None,
        };

        let inner = Arc::new(Inner {
            quick_cache: TtlCache::new("quick", &self.quick_cache),
            precise_cache: TtlCache::new("precise", &self.precise_cache),
            source,
            coalescer: Coalescer::new(self.debounce_window),
        });

        let sweeper = self
            .sweep_interval
            .and_then(|every| spawn_sweeper(Arc::clone(&inner), every));

        Ok(TokenCounter {
            inner,
            sweeper: Mutex::new(sweeper),
        })
    }
}

impl Default for TokenCounterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the periodic eviction sweep. Skipped outside a Tokio runtime —
/// expired entries are misses on read regardless, so only memory bounding
/// is lost.
fn spawn_sweeper(inner: Arc<Inner>, every: Duration) -> Option<JoinHandle<()>> {
    let runtime = tokio::runtime::Handle::try_current().ok()?;
    Some(runtime.spawn(async move {
        let start = tokio::time::Instant::now() + every;
        let mut ticks = tokio::time::interval_at(start, every);
        loop {
            ticks.tick().await;
            inner.quick_cache.evict_expired();
            inner.precise_cache.evict_expired();
            debug!(
                quick_entries = inner.quick_cache.entry_count(),
                precise_entries = inner.precise_cache.entry_count(),
                "evicted expired estimate cache entries"
            );
        }
    }))
}
