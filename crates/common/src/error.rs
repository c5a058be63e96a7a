//! Unified error type for the signal engine.
//!
//! The engine deliberately has very few hard failures: malformed upstream data
//! degrades to a WAIT signal instead of erroring. Only total unparseability of
//! the model output surfaces to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no structured data in model output: {snippet}")]
    NoStructuredData { snippet: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a `NoStructuredData` with a bounded snippet of the offending text.
    pub fn no_structured_data(raw: &str) -> Self {
        let snippet: String = raw.chars().take(120).collect();
        Error::NoStructuredData { snippet }
    }
}
