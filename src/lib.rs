//! Tokentally - two-tier token estimation for LLM prompts
//!
//! This crate estimates how many tokens a prompt (system / user / assistant
//! texts) costs for a set of target models, in two tiers:
//!
//! - **quick** — synchronous and infallible: exact BPE counts for
//!   OpenAI-family models, script-aware character ratios for the rest;
//! - **precise** — delegated to a remote tokenization service, debounced
//!   (calls within a window collapse into one request) and TTL-cached,
//!   degrading to the quick heuristic on any failure.
//!
//! # Example
//!
//! ```rust,no_run
//! use tokentally::{PromptFields, TokenCounter};
//!
//! #[tokio::main]
//! async fn main() -> tokentally::Result<()> {
//!     let counter = TokenCounter::builder()
//!         .endpoint("https://prompts.example.com")
//!         .build()?;
//!
//!     let fields = PromptFields::new(
//!         "You are a helpful assistant.",
//!         "What is the capital of France?",
//!         "",
//!     );
//!     let estimate = counter.estimate_smart(&fields, &["gpt-4o", "claude-3.5-sonnet"]);
//!
//!     // Heuristic counts are available immediately...
//!     for (model, count) in estimate.quick.iter() {
//!         println!("{model}: ~{count}");
//!     }
//!
//!     // ...and the precise counts arrive once the service answers.
//!     let precise = estimate.precise.await;
//!     for (model, count) in precise.iter() {
//!         println!("{model}: {count}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod counter;
pub mod error;
mod heuristic;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheStats};
pub use client::{HttpPreciseClient, PRECISE_ENDPOINT_PATH, PreciseSource};
pub use counter::{TokenCounter, TokenCounterBuilder};
pub use error::{Result, TallyError};
pub use types::{ModelFamily, PromptFields, SmartEstimate, TokenEstimate, Vocabulary};
