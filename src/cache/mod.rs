//! TTL caches for quick and precise estimates.
//!
//! Two independent tiers, both moka-backed (bounded LRU + TTL):
//!
//! - **quick** — per (model, field text) heuristic counts, so unchanged
//!   text skips the encoder pass;
//! - **precise** — whole-request results from the remote tokenizer, keyed
//!   on a stable hash of all three texts plus the sorted model list.
//!
//! Expired entries are misses on read; the periodic sweep driven by
//! [`TokenCounter`](crate::TokenCounter) only bounds memory.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::telemetry;
use crate::types::PromptFields;

/// Configuration for one cache tier.
///
/// ```rust
/// # use tokentally::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(50_000)
///     .ttl(Duration::from_secs(120));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// Time-to-live for cached entries. Default: 60 seconds.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    /// Create a new config with the default capacity and TTL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Hit/miss counters for one cache tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups served from cache; 0.0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

/// One TTL + LRU cache tier.
///
/// Thread-safe; reads and writes are lock-free from the caller's point of
/// view, so the synchronous quick path and the async precise path share
/// the same implementation. Emits cache hit/miss metrics labelled with the
/// tier name and keeps local counters for [`stats()`](Self::stats).
pub(crate) struct TtlCache<V: Clone + Send + Sync + 'static> {
    entries: moka::sync::Cache<u64, V>,
    tier: &'static str,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    /// Create a cache tier with the given configuration.
    pub fn new(tier: &'static str, config: &CacheConfig) -> Self {
        let entries = moka::sync::Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self {
            entries,
            tier,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a cached value. Expired entries are misses.
    pub fn get(&self, key: u64) -> Option<V> {
        match self.entries.get(&key) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "tier" => self.tier).increment(1);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "tier" => self.tier).increment(1);
                None
            }
        }
    }

    /// Insert (or overwrite) a value. The TTL clock starts now.
    pub fn insert(&self, key: u64, value: V) {
        self.entries.insert(key, value);
    }

    /// Hit/miss counters since construction.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Number of entries currently held (including not-yet-evicted expired ones).
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Drop expired entries. Best-effort memory bounding; correctness does
    /// not depend on it because expired entries miss on read.
    pub fn evict_expired(&self) {
        self.entries.run_pending_tasks();
    }
}

/// Key for a quick-tier entry: one model id plus one field text.
pub(crate) fn quick_key(model: &str, text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    model.hash(&mut hasher);
    text.hash(&mut hasher);
    hasher.finish()
}

/// Key for a precise-tier entry: all three texts plus the sorted,
/// deduplicated model list. Model order and duplicates do not change the
/// key, so equivalent requests share one entry.
pub(crate) fn precise_key(fields: &PromptFields, models: &[String]) -> u64 {
    let mut sorted: Vec<&str> = models.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut hasher = DefaultHasher::new();
    for text in fields.texts() {
        text.hash(&mut hasher);
    }
    for model in sorted {
        model.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> PromptFields {
        PromptFields::new("sys", "usr", "asst")
    }

    fn models(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn quick_key_deterministic() {
        assert_eq!(quick_key("gpt-4o", "hello"), quick_key("gpt-4o", "hello"));
    }

    #[test]
    fn quick_key_differs_on_model_and_text() {
        assert_ne!(quick_key("gpt-4o", "hello"), quick_key("gpt-4", "hello"));
        assert_ne!(quick_key("gpt-4o", "hello"), quick_key("gpt-4o", "world"));
    }

    #[test]
    fn precise_key_ignores_model_order_and_duplicates() {
        let a = precise_key(&fields(), &models(&["gpt-4o", "claude-3.5-sonnet"]));
        let b = precise_key(&fields(), &models(&["claude-3.5-sonnet", "gpt-4o"]));
        let c = precise_key(&fields(), &models(&["gpt-4o", "gpt-4o", "claude-3.5-sonnet"]));
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn precise_key_differs_on_any_field() {
        let base = precise_key(&fields(), &models(&["gpt-4o"]));
        let other_text = precise_key(&PromptFields::new("sys", "other", "asst"), &models(&["gpt-4o"]));
        let other_models = precise_key(&fields(), &models(&["gpt-4"]));
        assert_ne!(base, other_text);
        assert_ne!(base, other_models);
    }

    #[test]
    fn field_role_matters() {
        // The same text in a different role is a different request.
        let a = precise_key(&PromptFields::system("x"), &models(&["m"]));
        let b = precise_key(&PromptFields::user("x"), &models(&["m"]));
        assert_ne!(a, b);
    }

    #[test]
    fn get_and_insert_track_stats() {
        let cache: TtlCache<usize> = TtlCache::new("quick", &CacheConfig::default());
        assert_eq!(cache.get(1), None);
        cache.insert(1, 42);
        assert_eq!(cache.get(1), Some(42));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn expired_entries_miss_on_read() {
        let config = CacheConfig::new().ttl(Duration::from_millis(40));
        let cache: TtlCache<usize> = TtlCache::new("quick", &config);
        cache.insert(1, 42);
        assert_eq!(cache.get(1), Some(42));

        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(cache.get(1), None);
    }
}
