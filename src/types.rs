//! This module defines the core data structures shared by the engine: tape symbols,
//! head moves, transition actions, step and run outcomes, and the error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The character used to spell a blank cell in input words and table files.
pub const INPUT_BLANK_SYMBOL: char = '_';
/// The character used to draw a blank cell when rendering a tape.
pub const DISPLAY_BLANK_SYMBOL: char = ' ';
/// The maximum size of a table definition in bytes.
pub const MAX_TABLE_SIZE: usize = 65536; // 64KB
/// The default step budget used by callers that bound execution.
pub const MAX_EXECUTION_STEPS: usize = 1_000_000;

/// A single tape cell.
///
/// Blank is a regular member of the alphabet rather than an absent value, so
/// `(state, symbol)` is a total, comparable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Symbol {
    /// An untouched or erased cell.
    Blank,
    /// A cell holding a character of the machine's alphabet.
    Char(char),
}

impl Symbol {
    /// Reads a symbol from its textual form, mapping `INPUT_BLANK_SYMBOL` to `Blank`.
    pub fn from_input(c: char) -> Self {
        if c == INPUT_BLANK_SYMBOL {
            Symbol::Blank
        } else {
            Symbol::Char(c)
        }
    }

    /// Returns the textual form of the symbol, the inverse of [`Symbol::from_input`].
    pub fn to_input(self) -> char {
        match self {
            Symbol::Blank => INPUT_BLANK_SYMBOL,
            Symbol::Char(c) => c,
        }
    }

    pub fn is_blank(self) -> bool {
        self == Symbol::Blank
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_input())
    }
}

/// Represents the possible displacements of the read/write head after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    /// Move the head one cell to the left.
    Left,
    /// Move the head one cell to the right.
    Right,
    /// Keep the head on the same cell.
    None,
}

impl Move {
    /// Applies the move to a head index.
    pub fn apply(self, head: i64) -> i64 {
        match self {
            Move::Left => head - 1,
            Move::Right => head + 1,
            Move::None => head,
        }
    }
}

/// The right-hand side of a transition: what to do after reading a symbol in a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The state the machine moves to.
    pub next_state: String,
    /// The symbol written under the head.
    pub write: Symbol,
    /// The head displacement applied after writing.
    pub direction: Move,
}

impl Action {
    pub fn new(next_state: impl Into<String>, write: Symbol, direction: Move) -> Self {
        Self {
            next_state: next_state.into(),
            write,
            direction,
        }
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A transition was applied.
    Continue,
    /// No transition exists for the current state and symbol.
    Halt,
}

/// The result of running a machine until it halts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Halted in an accepting state; holds the final tape contents.
    Accepted(Vec<Symbol>),
    /// Halted in a non-accepting state.
    Rejected { state: String },
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    /// Returns the accepted tape contents as a word, or `None` on rejection.
    pub fn word(&self) -> Option<String> {
        match self {
            Outcome::Accepted(symbols) => Some(symbols_to_word(symbols)),
            Outcome::Rejected { .. } => None,
        }
    }
}

/// Spells a sequence of symbols as a word, writing blanks as `INPUT_BLANK_SYMBOL`.
pub fn symbols_to_word(symbols: &[Symbol]) -> String {
    symbols.iter().map(|s| s.to_input()).collect()
}

/// Represents the errors raised while building tables and machines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// The input word contains a character outside the table's alphabet.
    #[error("Invalid symbol '{0}': not in the machine's alphabet")]
    InvalidSymbol(char),
    /// A state name that is not declared by the table.
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// The run exceeded the caller's step budget.
    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(usize),
    /// Syntax error in a table definition.
    #[error("Table parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// A malformed transition table.
    #[error("Table validation error: {0}")]
    ValidationError(String),
    /// Reading a table file failed.
    #[error("File error: {0}")]
    FileError(String),
}
