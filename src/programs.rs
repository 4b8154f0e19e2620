//! Built-in transition tables.

use crate::table::TransitionTable;
use crate::types::{Action, MachineError, Move, Symbol};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::warn;

// Embedded table definitions
const TABLE_TEXTS: [&str; 1] = [include_str!("../tables/binary-increment.tm")];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<TransitionTable>> = RwLock::new(Vec::new());
}

/// The name of the built-in binary increment table.
pub const BINARY_INCREMENT: &str = "binary-increment";

/// Builds the binary increment table.
///
/// The machine scans right over the digits in `rightmost-digit`, turns around on the
/// first blank, and propagates the carry leftwards in `propagate-carry`: a `1` becomes
/// `0` and the carry moves on, a `0` (or the blank left of the number) becomes `1` and
/// the machine stops in `done`.
pub fn binary_increment() -> TransitionTable {
    let rules = [
        ("rightmost-digit", '0', "rightmost-digit", '0', Move::Right),
        ("rightmost-digit", '1', "rightmost-digit", '1', Move::Right),
        ("rightmost-digit", '_', "propagate-carry", '_', Move::Left),
        ("propagate-carry", '0', "done", '1', Move::None),
        ("propagate-carry", '1', "propagate-carry", '0', Move::Left),
        ("propagate-carry", '_', "done", '1', Move::None),
    ];

    let transitions: HashMap<(String, Symbol), Action> = rules
        .into_iter()
        .map(|(state, read, next, write, direction)| {
            (
                (state.to_string(), Symbol::from_input(read)),
                Action::new(next, Symbol::from_input(write), direction),
            )
        })
        .collect();

    let states: HashSet<String> = ["rightmost-digit", "propagate-carry", "done"]
        .into_iter()
        .map(String::from)
        .collect();

    TransitionTable::new(
        BINARY_INCREMENT,
        states,
        "rightmost-digit",
        HashSet::from(["done".to_string()]),
        transitions,
    )
    .unwrap_or_else(|e| unreachable!("binary increment table is well formed: {e}"))
}

pub struct ProgramManager;

impl ProgramManager {
    /// Parses the embedded tables into `PROGRAMS`, once.
    pub fn load() -> Result<(), MachineError> {
        let mut write_guard = PROGRAMS
            .write()
            .map_err(|_| MachineError::FileError("Failed to acquire write lock".to_string()))?;

        if !write_guard.is_empty() {
            return Ok(());
        }

        for text in TABLE_TEXTS {
            match crate::parser::parse(text) {
                Ok(table) => write_guard.push(table),
                Err(e) => warn!(error = %e, "failed to parse embedded table"),
            }
        }

        Ok(())
    }

    /// Get the number of available tables
    pub fn get_program_count() -> usize {
        let _ = Self::load();

        PROGRAMS.read().map(|tables| tables.len()).unwrap_or(0)
    }

    /// Get a table by its index
    pub fn get_program_by_index(index: usize) -> Result<TransitionTable, MachineError> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map_err(|_| MachineError::FileError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| {
                MachineError::ValidationError(format!("Table index {} out of range", index))
            })
    }

    /// Get a table by its name
    pub fn get_program_by_name(name: &str) -> Result<TransitionTable, MachineError> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map_err(|_| MachineError::FileError("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|table| table.name() == name)
            .cloned()
            .ok_or_else(|| MachineError::ValidationError(format!("Table '{}' not found", name)))
    }

    /// List all table names
    pub fn list_program_names() -> Vec<String> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map(|tables| tables.iter().map(|t| t.name().to_string()).collect())
            .unwrap_or_default()
    }

    /// Get the source text of a table by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, MachineError> {
        TABLE_TEXTS.get(index).copied().ok_or_else(|| {
            MachineError::ValidationError(format!("Table text index {} out of range", index))
        })
    }
}
