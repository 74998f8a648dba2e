//! Operator configuration for csvman.
//!
//! A small YAML file controls where databases live, where exports are
//! written, and how many rows previews show.
//!
//! # Example YAML
//!
//! ```yaml
//! data_dir: "."
//! export_dir: "exports"
//! sample_rows: 5
//! display_rows: 50
//! default_import_mode: append
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::ImportMode;

/// File name looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "csvman.yml";

/// Upper bound for rows rendered in one result view.
pub const MAX_DISPLAY_ROWS: usize = 500;

/// Top-level configuration.
///
/// Every field has a default, so a partial file is valid.
///
/// # Examples
///
/// ```
/// use csvman_core::{ImportMode, ManagerConfig};
///
/// let config: ManagerConfig = serde_yaml::from_str("sample_rows: 10").unwrap();
/// assert_eq!(config.sample_rows, 10);
/// assert_eq!(config.display_rows, 50);
/// assert_eq!(config.default_import_mode, ImportMode::Append);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Directory scanned for `*.db` files and used to resolve bare database names.
    pub data_dir: PathBuf,
    /// Directory receiving `query_result_*.csv` exports.
    pub export_dir: PathBuf,
    /// Rows shown per table by `describe` and `info`.
    pub sample_rows: usize,
    /// Rows shown for query results unless overridden.
    pub display_rows: usize,
    /// Mode used when importing into an existing table without `--mode`.
    pub default_import_mode: ImportMode,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            export_dir: PathBuf::from("."),
            sample_rows: 5,
            display_rows: 50,
            default_import_mode: ImportMode::Append,
        }
    }
}

impl ManagerConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CoreError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::CoreError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Loads `path` if given, else [`DEFAULT_CONFIG_FILE`] when it exists,
    /// else the defaults.
    ///
    /// An explicitly given path must exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Number of result rows to display, capped at [`MAX_DISPLAY_ROWS`].
    pub fn display_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.display_rows)
            .clamp(1, MAX_DISPLAY_ROWS)
    }
}
