//! A two-way unbounded tape backed by a growable vector.
//!
//! Cells are addressed by signed indices. The vector holds the materialized range
//! `[origin, origin + cells.len())`; everything outside reads as blank. Reads and
//! writes both materialize the addressed cell, so the tape only ever grows and the
//! materialized range is exactly the set of cells the head has visited.

use crate::types::Symbol;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: VecDeque<Symbol>,
    origin: i64,
}

impl Tape {
    /// Creates a tape holding `symbols` at indices `0..symbols.len()`.
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self {
            cells: symbols.into(),
            origin: 0,
        }
    }

    /// Creates a tape from a word, one character per cell.
    pub fn from_word(word: &str) -> Self {
        Self::new(word.chars().map(Symbol::from_input).collect())
    }

    /// Returns the symbol at `index`, materializing a blank cell if needed.
    pub fn read(&mut self, index: i64) -> Symbol {
        let offset = self.materialize(index);
        self.cells[offset]
    }

    /// Returns the symbol at `index` without growing the tape.
    pub fn peek(&self, index: i64) -> Symbol {
        self.offset(index)
            .and_then(|offset| self.cells.get(offset).copied())
            .unwrap_or(Symbol::Blank)
    }

    /// Writes `symbol` at `index`, materializing the cell first.
    pub fn write(&mut self, index: i64, symbol: Symbol) {
        let offset = self.materialize(index);
        self.cells[offset] = symbol;
    }

    /// Returns the leftmost and rightmost materialized indices, or `None` for an empty tape.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        if self.cells.is_empty() {
            return None;
        }

        Some((self.origin, self.origin + self.cells.len() as i64 - 1))
    }

    /// Returns the number of materialized cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns all materialized cells, left to right.
    pub fn cells(&self) -> Vec<Symbol> {
        self.cells.iter().copied().collect()
    }

    /// Returns the tape contents with blank padding trimmed from both ends.
    ///
    /// Interior blanks are kept, so every non-blank cell keeps its relative position.
    pub fn contents(&self) -> Vec<Symbol> {
        let first = self.cells.iter().position(|s| !s.is_blank());
        let last = self.cells.iter().rposition(|s| !s.is_blank());

        match (first, last) {
            (Some(first), Some(last)) => self.cells.range(first..=last).copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Maps a tape index to a vector offset if it lies inside the materialized range.
    fn offset(&self, index: i64) -> Option<usize> {
        let offset = index - self.origin;
        (offset >= 0 && (offset as usize) < self.cells.len()).then_some(offset as usize)
    }

    /// Extends the tape with blanks on either side until `index` is materialized.
    fn materialize(&mut self, index: i64) -> usize {
        if self.cells.is_empty() {
            self.origin = index;
        }

        while index < self.origin {
            self.cells.push_front(Symbol::Blank);
            self.origin -= 1;
        }

        let offset = (index - self.origin) as usize;
        if offset >= self.cells.len() {
            self.cells.resize(offset + 1, Symbol::Blank);
        }

        offset
    }
}
