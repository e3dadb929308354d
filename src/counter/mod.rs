//! The token counter: quick, precise, and smart estimation.

mod builder;
mod coalesce;

pub use builder::TokenCounterBuilder;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{self, CacheStats, TtlCache};
use crate::client::PreciseSource;
use crate::heuristic;
use crate::telemetry;
use crate::types::{ModelFamily, PromptFields, SmartEstimate, TokenEstimate};

use coalesce::Coalescer;

/// Two-tier token estimator for LLM prompts.
///
/// The quick tier is synchronous and heuristic: exact BPE counts for
/// OpenAI-family models, character ratios for the rest. The precise tier
/// delegates to a remote tokenization service, debounced and cached, and
/// degrades to the quick heuristic on any failure — no estimate operation
/// ever returns an error.
///
/// ```rust,no_run
/// use tokentally::{PromptFields, TokenCounter};
///
/// # async fn demo() -> tokentally::Result<()> {
/// let counter = TokenCounter::builder()
///     .endpoint("https://prompts.example.com")
///     .build()?;
///
/// let fields = PromptFields::new("You are a helpful assistant.", "Hi", "");
/// let estimate = counter.estimate_smart(&fields, &["gpt-4o", "claude-3.5-sonnet"]);
///
/// // Render the heuristic immediately, swap in the precise value later.
/// println!("~{:?}", estimate.quick);
/// println!("{:?}", estimate.precise.await);
/// # Ok(())
/// # }
/// ```
pub struct TokenCounter {
    inner: Arc<Inner>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

pub(crate) struct Inner {
    pub(crate) quick_cache: TtlCache<usize>,
    pub(crate) precise_cache: TtlCache<TokenEstimate>,
    pub(crate) source: Option<Arc<dyn PreciseSource>>,
    pub(crate) coalescer: Coalescer,
}

/// A precise-tokenization request with its precomputed cache key.
#[derive(Debug, Clone)]
pub(crate) struct PreciseRequest {
    pub(crate) fields: PromptFields,
    pub(crate) models: Vec<String>,
    pub(crate) key: u64,
}

impl PreciseRequest {
    pub(crate) fn new(fields: PromptFields, models: &[&str]) -> Self {
        let models: Vec<String> = models.iter().map(|m| m.to_string()).collect();
        let key = cache::precise_key(&fields, &models);
        Self { fields, models, key }
    }
}

impl TokenCounter {
    /// Create a new builder for configuring the counter.
    pub fn builder() -> TokenCounterBuilder {
        TokenCounterBuilder::new()
    }

    /// Quick heuristic counts for the given prompt and models.
    ///
    /// Synchronous and infallible: empty text is 0 tokens, unrecognised
    /// model ids get a flat-ratio estimate. Per-field results are cached
    /// so unchanged text skips the encoder pass within the cache TTL.
    pub fn estimate_quick(&self, fields: &PromptFields, models: &[&str]) -> TokenEstimate {
        self.inner.quick(fields, models)
    }

    /// Precise counts from the remote tokenization service.
    ///
    /// Calls within the debounce window collapse into one outbound
    /// computation; every caller of a burst resolves with the result of the
    /// burst's final arguments, so callers should re-derive from state
    /// rather than assume the result matches their own input. Fresh cached
    /// results return immediately. On any failure this resolves with the
    /// quick heuristic — it never returns an error.
    pub async fn estimate_precise(&self, fields: &PromptFields, models: &[&str]) -> TokenEstimate {
        let request = PreciseRequest::new(fields.clone(), models);
        self.inner.precise(request).await
    }

    /// Quick counts now, precise counts later.
    ///
    /// The precise computation starts immediately on the current Tokio
    /// runtime; the returned future only observes it. This is the primary
    /// entry point for interactive callers: render `quick` at once, swap
    /// in `precise` when it resolves.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn estimate_smart(&self, fields: &PromptFields, models: &[&str]) -> SmartEstimate {
        let quick = self.estimate_quick(fields, models);

        let request = PreciseRequest::new(fields.clone(), models);
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { inner.precise(request).await });

        let fallback = quick.clone();
        let precise = Box::pin(async move {
            // A cancelled task still resolves the caller, with the quick value.
            handle.await.unwrap_or(fallback)
        });

        SmartEstimate { quick, precise }
    }

    /// Hit/miss counters for the quick cache tier.
    pub fn quick_cache_stats(&self) -> CacheStats {
        self.inner.quick_cache.stats()
    }

    /// Hit/miss counters for the precise cache tier.
    pub fn precise_cache_stats(&self) -> CacheStats {
        self.inner.precise_cache.stats()
    }

    /// Stop the background eviction sweep.
    ///
    /// Idempotent; dropping the counter has the same effect. The caches
    /// keep working afterwards — expired entries are still misses on read,
    /// only the periodic memory bounding stops.
    pub fn stop(&self) {
        if let Some(handle) = self.sweeper.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Drop for TokenCounter {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Inner {
    fn quick<S: AsRef<str>>(&self, fields: &PromptFields, models: &[S]) -> TokenEstimate {
        let mut estimate = TokenEstimate::new();
        for model in models {
            let model = model.as_ref();
            estimate.insert(model, self.quick_model_count(model, fields));
        }
        estimate
    }

    fn quick_model_count(&self, model: &str, fields: &PromptFields) -> usize {
        let family = ModelFamily::of(model);
        fields
            .texts()
            .into_iter()
            .map(|text| self.quick_field_count(model, family, text))
            .sum()
    }

    fn quick_field_count(&self, model: &str, family: ModelFamily, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let key = cache::quick_key(model, text);
        if let Some(count) = self.quick_cache.get(key) {
            return count;
        }
        let count = heuristic::field_count(family, text);
        self.quick_cache.insert(key, count);
        count
    }

    async fn precise(self: &Arc<Self>, request: PreciseRequest) -> TokenEstimate {
        if let Some(hit) = self.precise_cache.get(request.key) {
            return hit;
        }

        // Keep enough of the request to fall back locally if the leader
        // vanishes before resolving us.
        let fields = request.fields.clone();
        let models = request.models.clone();

        let joined = self.coalescer.join(request);
        if joined.leader {
            tokio::spawn(drive(Arc::clone(self)));
        } else {
            metrics::counter!(telemetry::COALESCED_CALLS_TOTAL).increment(1);
        }

        match joined.receiver.await {
            Ok(estimate) => estimate,
            Err(_) => self.quick(&fields, &models),
        }
    }

    /// One precise computation for the slot's final request. Failures
    /// resolve with the quick heuristic and are not cached, so a later
    /// call retries the real endpoint.
    async fn compute_precise(&self, request: &PreciseRequest) -> TokenEstimate {
        // The slot may fire after an identical request already resolved.
        if let Some(hit) = self.precise_cache.get(request.key) {
            return hit;
        }

        let Some(source) = &self.source else {
            debug!("no precise source configured; answering with the quick heuristic");
            return self.quick(&request.fields, &request.models);
        };

        let start = Instant::now();
        match source.tokenize(&request.fields, &request.models).await {
            Ok(mut estimate) => {
                metrics::counter!(telemetry::PRECISE_REQUESTS_TOTAL, "status" => "ok").increment(1);
                metrics::histogram!(telemetry::PRECISE_DURATION_SECONDS)
                    .record(start.elapsed().as_secs_f64());
                self.fill_missing(&mut estimate, request);
                self.precise_cache.insert(request.key, estimate.clone());
                estimate
            }
            Err(error) => {
                metrics::counter!(telemetry::PRECISE_REQUESTS_TOTAL, "status" => "error")
                    .increment(1);
                metrics::counter!(telemetry::PRECISE_FALLBACKS_TOTAL).increment(1);
                warn!(%error, "precise tokenization failed; falling back to quick heuristic");
                self.quick(&request.fields, &request.models)
            }
        }
    }

    /// Requested models the server did not answer for get the heuristic
    /// count, so every requested model has a value to display.
    fn fill_missing(&self, estimate: &mut TokenEstimate, request: &PreciseRequest) {
        for model in &request.models {
            if !estimate.contains(model) {
                estimate.insert(model.clone(), self.quick_model_count(model, &request.fields));
            }
        }
    }
}

/// Drive the pending coalesced call: wait out the (possibly extended)
/// debounce window, then compute once and fan the result out.
async fn drive(inner: Arc<Inner>) {
    loop {
        // Slot already taken by an earlier driver means the waiters were
        // resolved; nothing left to do.
        let Some(deadline) = inner.coalescer.deadline() else {
            return;
        };
        tokio::time::sleep_until(deadline).await;

        if let Some((request, waiters)) = inner.coalescer.take_if_due() {
            let estimate = inner.compute_precise(&request).await;
            for waiter in waiters {
                let _ = waiter.send(estimate.clone());
            }
            return;
        }
    }
}
