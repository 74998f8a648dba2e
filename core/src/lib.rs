//! Core types shared across the csvman workspace.
//!
//! This crate defines the data model exchanged between storage, migration
//! and import/export:
//!
//! - [`Value`] — one cell, following SQLite's storage classes.
//! - [`TabularResult`] — ordered named columns with aligned rows; the
//!   universal exchange shape. [`ImportBatch`] is the same shape produced by
//!   the import adapter.
//! - [`TableInfo`] / [`ColumnInfo`] — introspected table schema.
//! - [`ColumnKind`] — inferred kind of a column, with the declared SQL type
//!   used to create it.
//! - [`TypeAffinity`] — SQLite affinity of a declared type string.
//!
//! Identifier handling ([`validate_identifier`], [`quote_identifier`],
//! [`resolve_identifier`]) keeps operator-supplied names from changing the
//! shape of generated SQL. [`ManagerConfig`] holds the YAML configuration.
//!
//! # Example
//!
//! ```
//! use csvman_core::*;
//!
//! let batch: ImportBatch = TabularResult::new(vec!["id".into(), "paid".into()])
//!     .with_rows(vec![vec![Value::Integer(1), Value::Boolean(true)]]);
//!
//! let kinds = batch.column_kinds();
//! assert_eq!(kinds[0].declared_type(), "INTEGER");
//! assert_eq!(kinds[1].declared_type(), "BOOLEAN");
//! assert_eq!(quote_identifier("paid"), "\"paid\"");
//! ```

mod config;
mod error;
mod types;
mod validate;

pub use config::{DEFAULT_CONFIG_FILE, MAX_DISPLAY_ROWS, ManagerConfig};
pub use error::{CoreError, Result};
pub use types::*;
pub use validate::{quote_identifier, resolve_identifier, validate_identifier};
