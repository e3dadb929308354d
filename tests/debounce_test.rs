//! Debounce collapsing on the precise path.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokentally::{PreciseSource, PromptFields, Result, TokenCounter, TokenEstimate};

/// Source that counts invocations and echoes the user text's character
/// count, so results identify which request was actually computed.
struct CountingSource {
    calls: AtomicUsize,
}

impl CountingSource {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PreciseSource for CountingSource {
    async fn tokenize(&self, fields: &PromptFields, models: &[String]) -> Result<TokenEstimate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut estimate = TokenEstimate::new();
        for model in models {
            estimate.insert(model.clone(), fields.user_text.chars().count());
        }
        Ok(estimate)
    }
}

fn counter_with(source: Arc<CountingSource>, window: Duration) -> TokenCounter {
    TokenCounter::builder()
        .precise_source(source)
        .debounce_window(window)
        .build()
        .expect("build counter")
}

#[tokio::test]
async fn burst_collapses_to_one_computation() {
    let source = CountingSource::new();
    let counter = counter_with(source.clone(), Duration::from_millis(100));
    let models = ["gpt-4o"];

    let pa = PromptFields::user("a");
    let pab = PromptFields::user("ab");
    let pabc = PromptFields::user("abc");
    let (a, b, c) = tokio::join!(
        counter.estimate_precise(&pa, &models),
        counter.estimate_precise(&pab, &models),
        counter.estimate_precise(&pabc, &models),
    );

    assert_eq!(source.calls(), 1, "burst must issue exactly one computation");

    // Every waiter observes the result of the burst's final call.
    assert_eq!(a.get("gpt-4o"), Some(3));
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[tokio::test]
async fn bursts_separated_by_the_window_run_independently() {
    let source = CountingSource::new();
    let counter = counter_with(source.clone(), Duration::from_millis(40));
    let models = ["gpt-4o"];

    let first = counter
        .estimate_precise(&PromptFields::user("first"), &models)
        .await;
    tokio::time::sleep(Duration::from_millis(80)).await;
    let second = counter
        .estimate_precise(&PromptFields::user("seconds"), &models)
        .await;

    assert_eq!(source.calls(), 2);
    assert_eq!(first.get("gpt-4o"), Some(5));
    assert_eq!(second.get("gpt-4o"), Some(7));
}

#[tokio::test]
async fn repeated_request_is_served_from_cache_without_debouncing() {
    let source = CountingSource::new();
    let counter = counter_with(source.clone(), Duration::from_millis(20));
    let fields = PromptFields::user("cache me");
    let models = ["gpt-4o"];

    let first = counter.estimate_precise(&fields, &models).await;
    let second = counter.estimate_precise(&fields, &models).await;

    assert_eq!(source.calls(), 1, "second call must be a cache hit");
    assert_eq!(first, second);
    assert_eq!(counter.precise_cache_stats().hits, 1);
}
