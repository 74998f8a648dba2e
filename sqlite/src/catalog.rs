//! Discovery of database files in a directory.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// File extension of database files.
pub const DATABASE_EXTENSION: &str = "db";

/// Lists `*.db` files in `dir`, sorted by name.
///
/// Only files that exist are reported; a database that has been named but
/// never written to does not show up. A missing directory yields an empty
/// list.
pub fn list_databases(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir.as_ref()) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let is_db = path
            .extension()
            .is_some_and(|ext| ext == DATABASE_EXTENSION);
        if is_db && path.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Resolves a database identifier to a file path.
///
/// A bare name (`sales`) gets the `.db` extension and lives in `dir`. A name
/// with an extension (`sales.db`) is looked up in `dir` too, unless it
/// already carries a directory component or is absolute, in which case it is
/// used as given.
pub fn database_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    let candidate = Path::new(name);
    if candidate.is_absolute() || candidate.components().count() > 1 {
        return candidate.to_path_buf();
    }
    if candidate.extension().is_some() {
        dir.as_ref().join(candidate)
    } else {
        dir.as_ref().join(format!("{name}.{DATABASE_EXTENSION}"))
    }
}
