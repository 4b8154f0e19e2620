//! This module defines `TransitionTable`, the immutable description of a deterministic
//! single-tape machine: its states, start state, accepting states, and the partial
//! transition mapping from `(state, symbol)` to an `Action`.

use crate::analyzer::analyze;
use crate::types::{Action, MachineError, Symbol};
use std::collections::{BTreeSet, HashMap, HashSet};

/// A validated, read-only transition table.
///
/// Tables are never mutated after construction, so one table can drive any number
/// of machines, including machines running on different threads.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable {
    name: String,
    states: HashSet<String>,
    start: String,
    accepting: HashSet<String>,
    rules: HashMap<String, HashMap<Symbol, Action>>,
}

impl TransitionTable {
    /// Builds a table and validates it.
    ///
    /// # Returns
    ///
    /// * `Ok(TransitionTable)` if the start state, the accepting states and every transition
    ///   source and target are declared.
    /// * `Err(MachineError::ValidationError)` describing the first problem found.
    pub fn new(
        name: impl Into<String>,
        states: HashSet<String>,
        start: impl Into<String>,
        accepting: HashSet<String>,
        transitions: HashMap<(String, Symbol), Action>,
    ) -> Result<Self, MachineError> {
        let mut rules: HashMap<String, HashMap<Symbol, Action>> = HashMap::new();
        for ((state, read), action) in transitions {
            rules.entry(state).or_default().insert(read, action);
        }

        let table = Self {
            name: name.into(),
            states,
            start: start.into(),
            accepting,
            rules,
        };

        analyze(&table)?;

        Ok(table)
    }

    /// Returns the action for `(state, symbol)`, or `None` when the pair has no entry.
    pub fn lookup(&self, state: &str, symbol: Symbol) -> Option<&Action> {
        self.rules.get(state)?.get(&symbol)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn states(&self) -> &HashSet<String> {
        &self.states
    }

    pub fn accepting(&self) -> &HashSet<String> {
        &self.accepting
    }

    /// Returns the transitions grouped by source state.
    pub fn rules(&self) -> &HashMap<String, HashMap<Symbol, Action>> {
        &self.rules
    }

    /// Iterates over every transition as `(state, read, action)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Symbol, &Action)> {
        self.rules.iter().flat_map(|(state, actions)| {
            actions
                .iter()
                .map(move |(read, action)| (state.as_str(), *read, action))
        })
    }

    /// Returns a flat copy of the transition mapping, in the form `new` accepts.
    pub fn transitions(&self) -> HashMap<(String, Symbol), Action> {
        self.iter()
            .map(|(state, read, action)| ((state.to_string(), read), action.clone()))
            .collect()
    }

    pub fn transition_count(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    pub fn is_accepting(&self, state: &str) -> bool {
        self.accepting.contains(state)
    }

    /// Returns the non-blank symbols the table reads or writes, in sorted order.
    pub fn alphabet(&self) -> BTreeSet<char> {
        self.iter()
            .flat_map(|(_, read, action)| [read, action.write])
            .filter_map(|symbol| match symbol {
                Symbol::Char(c) => Some(c),
                Symbol::Blank => None,
            })
            .collect()
    }

    /// Checks that every character of `word` belongs to the alphabet.
    ///
    /// `INPUT_BLANK_SYMBOL` spells a blank cell and is always accepted.
    pub fn check_word(&self, word: &str) -> Result<(), MachineError> {
        let alphabet = self.alphabet();

        word.chars()
            .map(Symbol::from_input)
            .find_map(|symbol| match symbol {
                Symbol::Char(c) if !alphabet.contains(&c) => Some(c),
                _ => None,
            })
            .map_or(Ok(()), |c| Err(MachineError::InvalidSymbol(c)))
    }
}
