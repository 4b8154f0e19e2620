//! This crate provides the engine of a deterministic single-tape Turing machine simulator.
//! It includes the tape and machine configuration, a validated transition table, a text
//! format and loader for tables, a renderer, and the built-in binary increment table.

pub mod analyzer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod render;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the `TableLoader` struct from the loader module.
pub use loader::TableLoader;
/// Re-exports the machine and its free-standing operations.
pub use machine::{init_machine, run_machine, step_machine, Machine};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports the built-in tables.
pub use programs::{binary_increment, ProgramManager, BINARY_INCREMENT, PROGRAMS};
/// Re-exports the `render` function from the render module.
pub use render::render;
/// Re-exports the `TransitionTable` struct from the table module.
pub use table::TransitionTable;
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the core types.
pub use types::{
    symbols_to_word, Action, MachineError, Move, Outcome, Step, Symbol, MAX_EXECUTION_STEPS,
    MAX_TABLE_SIZE,
};
