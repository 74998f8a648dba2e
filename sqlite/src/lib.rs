//! SQLite storage for csvman.
//!
//! This crate is the storage accessor and schema migrator: it lists and
//! describes tables, samples rows, runs ad-hoc SQL, writes tabular data in
//! append or replace mode, drops tables, and changes a column's declared
//! type by rebuilding the table.
//!
//! # Architecture
//!
//! - **`catalog`** — discovers `*.db` files and resolves database names
//! - **`database`** — [`Database`]: introspection, sampling, writes, drops
//! - **`query`** — ad-hoc SQL ([`Database::run_query`])
//! - **`migration`** — typed column rebuild ([`Database::change_column_type`])
//! - **`schema`** — introspection queries and SQL generation
//! - **`convert`** — [`Value`](csvman_core::Value) ↔ SQLite conversions
//!
//! # Connections
//!
//! There is no pooled or shared connection. Every operation opens the file,
//! does its work and closes it. Concurrent writers to the same file are not
//! coordinated beyond what SQLite itself does.
//!
//! # Quick start
//!
//! ```no_run
//! use csvman_sqlite::{Database, list_databases};
//!
//! for name in list_databases(".").unwrap() {
//!     let db = Database::new(&name);
//!     for table in db.describe_all().unwrap() {
//!         println!("{name}: {} ({} rows)", table.name, table.row_count);
//!     }
//! }
//!
//! let db = Database::new("sales.db");
//! db.change_column_type("orders", "amount", "FLOAT(30,4)").unwrap();
//! let result = db.run_query("SELECT SUM(amount) FROM orders").unwrap();
//! println!("{:?}", result.rows);
//! ```

mod catalog;
mod convert;
mod database;
mod error;
mod migration;
mod query;
mod schema;

pub use catalog::{DATABASE_EXTENSION, database_path, list_databases};
pub use database::{Database, WriteReport};
pub use error::{Result, StorageError};
pub use migration::MigrationReport;
pub use schema::{SHADOW_SUFFIX, shadow_table_name};
