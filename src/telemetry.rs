//! Telemetry metric name constants.
//!
//! Centralised metric names for tokentally operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `tokentally_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `tier` — cache tier: "quick" or "precise"
//! - `status` — outcome of a precise request: "ok" or "error"

/// Total estimate-cache hits.
///
/// Labels: `tier` ("quick" | "precise").
pub const CACHE_HITS_TOTAL: &str = "tokentally_cache_hits_total";

/// Total estimate-cache misses.
///
/// Labels: `tier` ("quick" | "precise").
pub const CACHE_MISSES_TOTAL: &str = "tokentally_cache_misses_total";

/// Total requests dispatched to the precise-tokenization source.
///
/// Labels: `status` ("ok" | "error").
pub const PRECISE_REQUESTS_TOTAL: &str = "tokentally_precise_requests_total";

/// Total precise requests that degraded to the quick heuristic.
pub const PRECISE_FALLBACKS_TOTAL: &str = "tokentally_precise_fallbacks_total";

/// Total precise calls absorbed into an already-open debounce slot.
pub const COALESCED_CALLS_TOTAL: &str = "tokentally_coalesced_calls_total";

/// Precise request duration in seconds.
pub const PRECISE_DURATION_SECONDS: &str = "tokentally_precise_duration_seconds";
