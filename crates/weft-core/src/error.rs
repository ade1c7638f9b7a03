//! Error types for weft-core.

use std::io;

/// Error type for weft-core operations.
#[derive(Debug, thiserror::Error)]
pub enum WeftError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Template compilation rejected a malformed node tree.
    #[error("compile error: {0}")]
    Compile(String),

    /// Terminal operation failed.
    #[error("terminal error: {0}")]
    Terminal(String),

    /// Layer operation failed.
    #[error("layer error: {0}")]
    Layer(String),

    /// Key pattern could not be parsed.
    #[error("key pattern error: {0}")]
    KeyPattern(String),
}

/// Result type alias for weft-core operations.
pub type Result<T> = std::result::Result<T, WeftError>;
