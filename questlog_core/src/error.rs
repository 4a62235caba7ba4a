//! Error types for the questlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for questlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error in the snapshot layer
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or missing input to a store mutation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation targeted an id that does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Import document could not be parsed as a quest log
    #[error("Format error: {0}")]
    Format(String),
}

impl Error {
    pub(crate) fn skill_not_found(id: &str) -> Self {
        Error::NotFound {
            kind: "Skill",
            id: id.to_string(),
        }
    }

    pub(crate) fn habit_not_found(id: &str) -> Self {
        Error::NotFound {
            kind: "Habit",
            id: id.to_string(),
        }
    }
}
