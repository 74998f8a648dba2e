//! Ad-hoc SQL execution.
//!
//! SQL text runs verbatim. This is a deliberate trust boundary: csvman is a
//! single-operator tool and the operator is allowed to run anything the
//! engine accepts, including DDL and DML. Nothing is sanitized or
//! restricted. Only one statement is prepared per call.

use csvman_core::TabularResult;
use tracing::debug;

use crate::convert::read_rows;
use crate::database::Database;
use crate::error::{Result, StorageError};

impl Database {
    /// Executes one SQL statement and returns its rows.
    ///
    /// Statements that produce no result columns (DDL, `INSERT`, `UPDATE`,
    /// ...) yield an empty result with
    /// [`rows_affected`](TabularResult::rows_affected) set. The database file
    /// is created if it does not exist, so a `CREATE TABLE` works on a new
    /// database.
    ///
    /// # Errors
    ///
    /// Every engine failure, including malformed SQL and unknown tables, is
    /// returned as [`StorageError::QueryError`] with SQLite's message intact.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use csvman_sqlite::{Database, StorageError};
    ///
    /// let db = Database::new("sales.db");
    /// match db.run_query("SELECT * FROM nonexistent") {
    ///     Err(StorageError::QueryError(msg)) => assert!(msg.contains("no such table")),
    ///     other => panic!("unexpected: {other:?}"),
    /// }
    /// ```
    pub fn run_query(&self, sql: &str) -> Result<TabularResult> {
        if sql.trim().is_empty() {
            return Err(StorageError::QueryError("empty query".to_string()));
        }
        let conn = self.connect()?;
        debug!(sql, "Running query");

        let mut stmt = conn.prepare(sql).map_err(query_error)?;
        if stmt.column_count() == 0 {
            let changed = stmt.execute([]).map_err(query_error)?;
            return Ok(TabularResult {
                rows_affected: Some(changed),
                ..TabularResult::default()
            });
        }
        read_rows(&mut stmt, []).map_err(query_error)
    }
}

fn query_error(err: rusqlite::Error) -> StorageError {
    StorageError::QueryError(err.to_string())
}
