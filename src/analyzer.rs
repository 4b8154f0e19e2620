//! This module provides the checks run on every `TransitionTable` at construction time.
//! A table that fails any of them is malformed and never reaches a machine. Unreachable
//! states are only logged.

use crate::table::TransitionTable;
use crate::types::MachineError;
use std::collections::HashSet;
use tracing::warn;

/// Represents the problems that make a transition table malformed.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The table declares no states at all.
    EmptyStateSet,
    /// The start state is not in the declared state set.
    InvalidStartState(String),
    /// Accepting states that are not in the declared state set.
    UndeclaredAcceptingStates(Vec<String>),
    /// Transitions whose source state is not declared.
    UndeclaredSourceStates(Vec<String>),
    /// Transitions that lead to states that are not declared.
    UndefinedNextStates(Vec<String>),
    /// Declared states that cannot be reached from the start state. Logged, never fatal.
    UnreachableStates(Vec<String>),
}

impl From<AnalysisError> for MachineError {
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::EmptyStateSet => {
                MachineError::ValidationError("No states declared".to_string())
            }
            AnalysisError::InvalidStartState(state) => {
                MachineError::ValidationError(format!("Invalid start state: {}", state))
            }
            AnalysisError::UndeclaredAcceptingStates(states) => MachineError::ValidationError(
                format!("Accepting states are not declared: {:?}", states),
            ),
            AnalysisError::UndeclaredSourceStates(states) => MachineError::ValidationError(
                format!("Transitions start from undeclared states: {:?}", states),
            ),
            AnalysisError::UndefinedNextStates(transitions) => MachineError::ValidationError(
                format!("Transitions reference undefined states: {:?}", transitions),
            ),
            AnalysisError::UnreachableStates(states) => MachineError::ValidationError(format!(
                "Unreachable states detected: {:?}",
                states
            )),
        }
    }
}

/// Analyzes a `TransitionTable`, returning the first problem found.
///
/// # Returns
///
/// * `Ok(())` if the table is well formed.
/// * `Err(MachineError::ValidationError)` otherwise.
pub fn analyze(table: &TransitionTable) -> Result<(), MachineError> {
    let first_error = [
        check_states,
        check_start_state,
        check_accepting_states,
        check_source_states,
        check_next_states,
    ]
    .iter()
    .find_map(|f| f(table).err());

    if let Some(error) = first_error {
        return Err(error.into());
    }

    // Unreachable states are logged, not rejected.
    if let Err(AnalysisError::UnreachableStates(states)) = check_unreachable_states(table) {
        warn!(table = table.name(), ?states, "unreachable states");
    }

    Ok(())
}

fn check_states(table: &TransitionTable) -> Result<(), AnalysisError> {
    if table.states().is_empty() {
        return Err(AnalysisError::EmptyStateSet);
    }

    Ok(())
}

fn check_start_state(table: &TransitionTable) -> Result<(), AnalysisError> {
    if !table.states().contains(table.start()) {
        return Err(AnalysisError::InvalidStartState(table.start().to_string()));
    }

    Ok(())
}

fn check_accepting_states(table: &TransitionTable) -> Result<(), AnalysisError> {
    let undeclared = sorted(table.accepting().difference(table.states()));

    if !undeclared.is_empty() {
        return Err(AnalysisError::UndeclaredAcceptingStates(undeclared));
    }

    Ok(())
}

fn check_source_states(table: &TransitionTable) -> Result<(), AnalysisError> {
    let undeclared = sorted(
        table
            .rules()
            .keys()
            .filter(|state| !table.states().contains(*state)),
    );

    if !undeclared.is_empty() {
        return Err(AnalysisError::UndeclaredSourceStates(undeclared));
    }

    Ok(())
}

/// Checks that every action's `next_state` is declared.
///
/// Offending transitions are reported as `state[symbol] -> next`.
fn check_next_states(table: &TransitionTable) -> Result<(), AnalysisError> {
    let mut undefined: Vec<String> = table
        .iter()
        .filter(|(_, _, action)| !table.states().contains(&action.next_state))
        .map(|(state, symbol, action)| format!("{}[{}] -> {}", state, symbol, action.next_state))
        .collect();

    if !undefined.is_empty() {
        undefined.sort();
        return Err(AnalysisError::UndefinedNextStates(undefined));
    }

    Ok(())
}

/// Finds declared states that no sequence of transitions reaches from the start state.
fn check_unreachable_states(table: &TransitionTable) -> Result<(), AnalysisError> {
    let mut visited = HashSet::new();
    let mut queue = vec![table.start()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for action in table.rules().get(state).into_iter().flat_map(|rules| rules.values()) {
            if !visited.contains(action.next_state.as_str()) {
                queue.push(action.next_state.as_str());
            }
        }
    }

    let unreachable = sorted(
        table
            .states()
            .iter()
            .filter(|state| !visited.contains(state.as_str())),
    );

    if !unreachable.is_empty() {
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}

fn sorted<'a>(states: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut states: Vec<String> = states.cloned().collect();
    states.sort();
    states
}
