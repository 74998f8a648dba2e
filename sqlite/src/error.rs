//! Error types for storage and migration operations.
//!
//! Engine errors are carried verbatim: the operator reads and fixes SQL and
//! type mistakes directly, so nothing here rewrites SQLite's messages.

use std::path::PathBuf;

use csvman_core::CoreError;
use thiserror::Error;

/// Errors that can occur while accessing or migrating a database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite operation failure outside of ad-hoc queries.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// The database file does not exist.
    #[error("database not found: {}", .0.display())]
    DatabaseNotFound(PathBuf),

    /// Filesystem failure, e.g. while listing databases.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Ad-hoc SQL failed; carries the engine message unchanged.
    #[error("query error: {0}")]
    QueryError(String),

    /// Appended data does not match the target table's columns.
    #[error("schema mismatch for table '{table}': {detail}")]
    SchemaMismatch { table: String, detail: String },

    /// A table that must not exist yet already does.
    #[error("table '{0}' already exists")]
    NameCollision(String),

    /// The named table does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The named column does not exist in the table.
    #[error("column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// Data names the same column twice.
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    /// An existing value cannot be converted to the requested type.
    #[error("cannot cast value '{value}' in column '{column}' to {target_type}")]
    CastError {
        column: String,
        value: String,
        target_type: String,
    },

    /// The column rebuild did not reach a consistent state and was rolled back.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Identifier validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience alias for results with [`StorageError`].
pub type Result<T> = std::result::Result<T, StorageError>;
