//! Error types for configuration loading and identifier validation.

use thiserror::Error;

/// Errors raised by the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A table or column name that cannot be used in SQL.
    #[error("invalid identifier '{0}': must be non-empty and contain no NUL characters")]
    InvalidIdentifier(String),
}

/// Convenience alias for results with [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
