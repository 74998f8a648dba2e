//! Identifier validation and quoting.
//!
//! Table and column names come from the operator (or from CSV headers) and
//! end up inside DDL/DML text. Every name is double-quoted before it is
//! interpolated, and names of objects that must already exist are resolved
//! against the introspected schema first, so an unknown name never reaches
//! the SQL text.
//!
//! # Examples
//!
//! ```
//! use csvman_core::{quote_identifier, resolve_identifier};
//!
//! assert_eq!(quote_identifier("order items"), "\"order items\"");
//! assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
//!
//! let tables = ["Orders", "customers"];
//! assert_eq!(resolve_identifier(tables, "orders"), Some("Orders"));
//! assert_eq!(resolve_identifier(tables, "orders; DROP TABLE x"), None);
//! ```

use crate::error::{CoreError, Result};

/// Checks that a name for a new table or column is usable.
///
/// SQLite accepts almost anything inside a quoted identifier; only empty
/// (or whitespace-only) names and embedded NUL characters are rejected.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains('\0') {
        return Err(CoreError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

/// Double-quotes an identifier, doubling any embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Finds `name` among known identifiers, ignoring ASCII case.
///
/// Returns the identifier as stored, or `None` if it is unknown. An exact
/// match wins over a case-insensitive one.
pub fn resolve_identifier<'a, I>(known: I, name: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut folded = None;
    for candidate in known {
        if candidate == name {
            return Some(candidate);
        }
        if folded.is_none() && candidate.eq_ignore_ascii_case(name) {
            folded = Some(candidate);
        }
    }
    folded
}
