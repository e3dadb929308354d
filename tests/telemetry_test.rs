//! Metric emission through the `metrics` facade, captured with the
//! debugging recorder.

use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use tokentally::{PromptFields, TokenCounter, telemetry};

#[test]
fn quick_cache_lookups_emit_hit_and_miss_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let counter = TokenCounter::builder().build().unwrap();
        let fields = PromptFields::user("metered text");
        counter.estimate_quick(&fields, &["gpt-4o"]);
        counter.estimate_quick(&fields, &["gpt-4o"]);
    });

    let snapshot = snapshotter.snapshot().into_vec();
    let total = |name: &str| -> u64 {
        snapshot
            .iter()
            .filter(|(key, _, _, _)| key.key().name() == name)
            .map(|(_, _, _, value)| match value {
                DebugValue::Counter(v) => *v,
                _ => 0,
            })
            .sum()
    };

    assert_eq!(total(telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(total(telemetry::CACHE_HITS_TOTAL), 1);
}
