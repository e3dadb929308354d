//! Tokentally error types

/// Tokentally error types
///
/// Only construction and the precise-tokenization client surface these.
/// The estimate operations themselves are error-free by contract: a failed
/// precise request is logged and recovered with the quick heuristic, never
/// propagated to the caller.
#[derive(Debug, thiserror::Error)]
pub enum TallyError {
    // Transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for Tokentally operations
pub type Result<T> = std::result::Result<T, TallyError>;
