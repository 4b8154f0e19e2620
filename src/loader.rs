//! This module provides the `TableLoader` struct, responsible for loading transition tables
//! from files, strings, and directories of `.tm` files.

use crate::parser::parse;
use crate::table::TransitionTable;
use crate::types::MachineError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The file extension of table definitions.
pub const TABLE_EXTENSION: &str = "tm";

/// `TableLoader` is a utility struct for loading transition tables.
pub struct TableLoader;

impl TableLoader {
    /// Loads a single table from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(TransitionTable)` if the file is read, parsed and validated.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * `Err(MachineError::ParseError)` or `Err(MachineError::ValidationError)` if the
    ///   content is not a valid table.
    pub fn load_table(path: &Path) -> Result<TransitionTable, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "loading table");
        parse(&content)
    }

    /// Loads a single table from the provided string content.
    pub fn load_table_from_string(content: &str) -> Result<TransitionTable, MachineError> {
        parse(content)
    }

    /// Loads every `.tm` file in `directory`.
    ///
    /// Subdirectories and files with other extensions are skipped. Each entry of the
    /// result is either the path and its table, or the error that file produced.
    pub fn load_tables(directory: &Path) -> Vec<Result<(PathBuf, TransitionTable), MachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(MachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                if path.is_dir() || path.extension().is_none_or(|ext| ext != TABLE_EXTENSION) {
                    return None;
                }

                match Self::load_table(&path) {
                    Ok(table) => Some(Ok((path, table))),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping invalid table");
                        Some(Err(MachineError::FileError(format!(
                            "Failed to load table from {}: {}",
                            path.display(),
                            e
                        ))))
                    }
                }
            })
            .collect()
    }
}
