//! Error types for turngate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TurnGateError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Classification errors
    #[error("Classification failed: {message}")]
    Classification { message: String },

    #[error("Classifier state corrupted: expected shape {expected}, got {actual}")]
    StateCorruption { expected: usize, actual: usize },

    #[error("Classifier worker unavailable: {message}")]
    ClassifierUnavailable { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl TurnGateError {
    /// Returns true if this error terminates the stream it occurred on.
    ///
    /// Classification faults and a missing worker are absorbed by the guard
    /// (the frame fails closed to silence); everything else surfaced through
    /// `push` is stream-fatal.
    pub fn is_stream_fatal(&self) -> bool {
        !matches!(
            self,
            TurnGateError::Classification { .. } | TurnGateError::ClassifierUnavailable { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, TurnGateError>;
