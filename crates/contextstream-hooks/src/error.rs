// crates/contextstream-hooks/src/error.rs
// Standardized error types for the tool gate

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the gate library
#[derive(Error, Debug)]
pub enum GateError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("corrupt state file {path}: {source}")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Result using GateError
pub type Result<T> = std::result::Result<T, GateError>;

impl GateError {
    /// Short label used when an error is folded into a decision diagnostic
    pub fn kind(&self) -> &'static str {
        match self {
            GateError::InvalidInput(_) => "invalid_input",
            GateError::CorruptState { .. } => "corrupt_state",
            GateError::Io(_) => "io",
            GateError::Json(_) => "json",
            GateError::Toml(_) => "toml",
        }
    }
}
