//! Error types for Storyteller.

use thiserror::Error;

/// Top-level result type for Storyteller operations.
pub type Result<T> = std::result::Result<T, StoryError>;

/// Top-level error type for Storyteller.
#[derive(Debug, Error)]
pub enum StoryError {
    /// A stored filename does not start with a `YYYY-MM-DD ` date prefix.
    #[error("malformed record '{filename}': {reason}")]
    MalformedRecord { filename: String, reason: String },

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Row data or a column reference does not match the table header.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("no row is selected")]
    NoSelection,

    #[error("invalid title '{title}': {reason}")]
    InvalidTitle { title: String, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoryError {
    pub(crate) fn malformed(filename: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            filename: filename.to_string(),
            reason: reason.into(),
        }
    }
}
