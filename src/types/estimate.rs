//! Estimate result types

use std::collections::BTreeMap;
use std::fmt;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// Per-model token counts from one estimate pass.
///
/// Keys are the model identifiers exactly as the caller supplied them.
/// Iteration order is deterministic (sorted by model id).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenEstimate {
    counts: BTreeMap<String, usize>,
}

impl TokenEstimate {
    /// Empty estimate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing model → count map.
    pub fn from_counts(counts: BTreeMap<String, usize>) -> Self {
        Self { counts }
    }

    /// Token count for a model, if present.
    pub fn get(&self, model: &str) -> Option<usize> {
        self.counts.get(model).copied()
    }

    /// Set the count for a model, overwriting any previous value.
    pub fn insert(&mut self, model: impl Into<String>, count: usize) {
        self.counts.insert(model.into(), count);
    }

    /// Whether a count is present for the model.
    pub fn contains(&self, model: &str) -> bool {
        self.counts.contains_key(model)
    }

    /// Number of models with a count.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no counts are present.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate (model, count) pairs in model order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(model, count)| (model.as_str(), *count))
    }
}

/// A quick estimate plus the pending precise one.
///
/// `quick` is computed synchronously and can be rendered immediately, marked
/// as provisional. `precise` resolves later and always yields a value — on
/// failure it carries the quick heuristic forward, so awaiting cannot error.
pub struct SmartEstimate {
    /// Heuristic counts, available immediately.
    pub quick: TokenEstimate,
    /// Future precise counts. Never fails.
    pub precise: BoxFuture<'static, TokenEstimate>,
}

impl fmt::Debug for SmartEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartEstimate")
            .field("quick", &self.quick)
            .field("precise", &"<pending>")
            .finish()
    }
}
