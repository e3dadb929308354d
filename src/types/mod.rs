//! Public types for the Tokentally API.

mod estimate;
mod model;
mod prompt;

pub use estimate::{SmartEstimate, TokenEstimate};
pub use model::{ModelFamily, Vocabulary};
pub use prompt::PromptFields;
