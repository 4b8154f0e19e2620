//! This module defines the `Machine` struct, a configuration of a deterministic single-tape
//! Turing machine (tape, head position, current state) driven by a shared `TransitionTable`.

use crate::table::TransitionTable;
use crate::tape::Tape;
use crate::types::{MachineError, Outcome, Step, Symbol};
use tracing::{debug, trace};

/// A machine configuration.
///
/// The machine borrows its table and exclusively owns its tape, head and state.
/// Independent machines may share one table across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Machine<'t> {
    table: &'t TransitionTable,
    word: String,
    tape: Tape,
    head: i64,
    state: String,
    step_count: usize,
}

impl<'t> Machine<'t> {
    /// Creates a machine with `word` on the tape, one character per cell, the head on
    /// the leftmost cell, in the table's start state.
    ///
    /// # Returns
    ///
    /// * `Ok(Machine)` if every character of `word` is in the table's alphabet.
    /// * `Err(MachineError::InvalidSymbol)` otherwise.
    pub fn new(table: &'t TransitionTable, word: &str) -> Result<Self, MachineError> {
        table.check_word(word)?;

        debug!(table = table.name(), word, "initializing machine");

        Ok(Self {
            table,
            word: word.to_string(),
            tape: Tape::from_word(word),
            head: 0,
            state: table.start().to_string(),
            step_count: 0,
        })
    }

    /// Applies one transition.
    ///
    /// Reads the symbol under the head, looks up `(state, symbol)`, writes, changes
    /// state, and moves the head. Acceptance is not inspected here.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition was applied.
    /// * `Step::Halt` if the table has no entry for the current state and symbol.
    pub fn step(&mut self) -> Step {
        let symbol = self.tape.read(self.head);

        let table = self.table;
        let Some(action) = table.lookup(&self.state, symbol) else {
            trace!(state = %self.state, %symbol, head = self.head, "no transition");
            return Step::Halt;
        };

        trace!(
            step = self.step_count,
            state = %self.state,
            %symbol,
            head = self.head,
            next = %action.next_state,
            write = %action.write,
            direction = ?action.direction,
            "transition"
        );

        self.tape.write(self.head, action.write);
        self.state.clone_from(&action.next_state);
        self.head = action.direction.apply(self.head);
        self.step_count += 1;

        Step::Continue
    }

    /// Steps until no transition applies, then reports acceptance based on the final state.
    ///
    /// Termination depends on the table; use [`Machine::run_bounded`] for untrusted tables.
    pub fn run(mut self) -> Outcome {
        while self.step() == Step::Continue {}

        self.outcome()
    }

    /// Applies at most `max_steps` transitions.
    ///
    /// # Returns
    ///
    /// * `Step::Halt` if the machine halted, possibly on the last transition of the budget.
    /// * `Step::Continue` if the budget ran out with a transition still applicable.
    pub fn advance(&mut self, max_steps: usize) -> Step {
        for _ in 0..max_steps {
            if self.step() == Step::Halt {
                return Step::Halt;
            }
        }

        if self.is_halted() {
            Step::Halt
        } else {
            Step::Continue
        }
    }

    /// Like [`Machine::run`], but gives up after `max_steps` transitions.
    ///
    /// # Returns
    ///
    /// * `Ok(Outcome)` if the machine halts within the budget.
    /// * `Err(MachineError::StepLimitExceeded)` otherwise.
    pub fn run_bounded(mut self, max_steps: usize) -> Result<Outcome, MachineError> {
        if self.advance(max_steps) == Step::Halt {
            return Ok(self.outcome());
        }

        debug!(max_steps, state = %self.state, "step limit exceeded");
        Err(MachineError::StepLimitExceeded(max_steps))
    }

    /// Reports the outcome of a halted machine.
    fn outcome(&self) -> Outcome {
        let outcome = if self.is_accepting() {
            Outcome::Accepted(self.tape.contents())
        } else {
            Outcome::Rejected {
                state: self.state.clone(),
            }
        };

        debug!(
            state = %self.state,
            steps = self.step_count,
            accepted = outcome.is_accepted(),
            "machine halted"
        );

        outcome
    }

    /// Restores the initial configuration for the word the machine was created with.
    pub fn reset(&mut self) {
        self.tape = Tape::from_word(&self.word);
        self.head = 0;
        self.state = self.table.start().to_string();
        self.step_count = 0;
    }

    pub fn table(&self) -> &'t TransitionTable {
        self.table
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn head(&self) -> i64 {
        self.head
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns the symbol under the head; cells outside the tape read as blank.
    pub fn symbol(&self) -> Symbol {
        self.tape.peek(self.head)
    }

    pub fn is_accepting(&self) -> bool {
        self.table.is_accepting(&self.state)
    }

    /// Returns `true` if no transition applies to the current state and symbol.
    pub fn is_halted(&self) -> bool {
        self.table.lookup(&self.state, self.symbol()).is_none()
    }
}

/// Returns a machine with `word` on the tape in the table's start state.
pub fn init_machine<'t>(
    table: &'t TransitionTable,
    word: &str,
) -> Result<Machine<'t>, MachineError> {
    Machine::new(table, word)
}

/// Computes one step, returning the next configuration or `None` if no transition applies.
pub fn step_machine<'t>(machine: &Machine<'t>) -> Option<Machine<'t>> {
    let mut next = machine.clone();
    match next.step() {
        Step::Continue => Some(next),
        Step::Halt => None,
    }
}

/// Runs the machine to completion, returning the final word on success or `None` on rejection.
pub fn run_machine(machine: Machine<'_>) -> Option<Vec<Symbol>> {
    match machine.run() {
        Outcome::Accepted(symbols) => Some(symbols),
        Outcome::Rejected { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::binary_increment;
    use crate::types::{symbols_to_word, Action, Move};
    use std::collections::{HashMap, HashSet};

    fn increment(word: &str) -> Option<String> {
        let table = binary_increment();
        let machine = init_machine(&table, word).unwrap();
        run_machine(machine).map(|symbols| symbols_to_word(&symbols))
    }

    /// A single-state table that walks right forever over '1's and accepts nothing.
    fn runaway_table() -> TransitionTable {
        let mut transitions = HashMap::new();
        transitions.insert(
            ("walk".to_string(), Symbol::Blank),
            Action::new("walk", Symbol::Char('1'), Move::Right),
        );
        transitions.insert(
            ("walk".to_string(), Symbol::Char('1')),
            Action::new("walk", Symbol::Char('1'), Move::Right),
        );

        TransitionTable::new(
            "Runaway",
            HashSet::from(["walk".to_string()]),
            "walk",
            HashSet::new(),
            transitions,
        )
        .unwrap()
    }

    #[test]
    fn test_machine_creation() {
        let table = binary_increment();
        let machine = Machine::new(&table, "101").unwrap();

        assert_eq!(machine.state(), "rightmost-digit");
        assert_eq!(machine.head(), 0);
        assert_eq!(symbols_to_word(&machine.tape().cells()), "101");
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.symbol(), Symbol::Char('1'));
    }

    #[test]
    fn test_machine_creation_invalid_symbol() {
        let table = binary_increment();
        let result = Machine::new(&table, "10201");

        assert_eq!(result.unwrap_err(), MachineError::InvalidSymbol('2'));
    }

    #[test]
    fn test_single_step() {
        let table = binary_increment();
        let mut machine = Machine::new(&table, "10").unwrap();

        assert_eq!(machine.step(), Step::Continue);
        assert_eq!(machine.state(), "rightmost-digit");
        assert_eq!(machine.head(), 1);
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_step_materializes_blank_on_right() {
        let table = binary_increment();
        let mut machine = Machine::new(&table, "1").unwrap();

        machine.step(); // scan past the digit
        assert_eq!(machine.head(), 1);
        assert_eq!(machine.tape().len(), 1);

        machine.step(); // read the blank and turn around
        assert_eq!(machine.state(), "propagate-carry");
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.tape().bounds(), Some((0, 1)));
    }

    #[test]
    fn test_step_extends_tape_on_left() {
        let table = binary_increment();
        let mut machine = Machine::new(&table, "1").unwrap();

        while machine.step() == Step::Continue {}

        assert_eq!(machine.state(), "done");
        assert_eq!(machine.head(), -1);
        assert_eq!(machine.tape().bounds(), Some((-1, 1)));
        assert_eq!(symbols_to_word(&machine.tape().cells()), "10_");
    }

    #[test]
    fn test_step_machine_leaves_input_untouched() {
        let table = binary_increment();
        let machine = init_machine(&table, "0").unwrap();

        let next = step_machine(&machine).expect("a transition applies");
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(next.head(), 1);
        assert_eq!(next.step_count(), 1);
    }

    #[test]
    fn test_step_machine_halts_in_done() {
        let table = binary_increment();
        let mut machine = init_machine(&table, "0").unwrap();
        while let Some(next) = step_machine(&machine) {
            machine = next;
        }

        assert_eq!(machine.state(), "done");
        assert!(machine.is_accepting());
        assert!(step_machine(&machine).is_none());
    }

    #[test]
    fn test_step_is_deterministic() {
        let table = binary_increment();
        let mut a = init_machine(&table, "1011").unwrap();
        let mut b = init_machine(&table, "1011").unwrap();

        loop {
            let (sa, sb) = (a.step(), b.step());
            assert_eq!(sa, sb);
            assert_eq!(a, b);
            if sa == Step::Halt {
                break;
            }
        }
    }

    #[test]
    fn test_run_increments() {
        assert_eq!(increment("101").as_deref(), Some("110"));
        assert_eq!(increment("111").as_deref(), Some("1000"));
        assert_eq!(increment("0").as_deref(), Some("1"));
        assert_eq!(increment("").as_deref(), Some("1"));
        assert_eq!(increment("1001").as_deref(), Some("1010"));
    }

    #[test]
    fn test_run_rejects_without_accepting_state() {
        let base = binary_increment();
        let table = TransitionTable::new(
            "No accepting states",
            base.states().clone(),
            base.start(),
            HashSet::new(),
            base.transitions(),
        )
        .unwrap();

        let machine = init_machine(&table, "101").unwrap();
        assert_eq!(
            machine.run(),
            Outcome::Rejected {
                state: "done".to_string()
            }
        );
    }

    #[test]
    fn test_run_rejects_without_blank_carry() {
        let base = binary_increment();
        let mut transitions = base.transitions();
        transitions.remove(&("propagate-carry".to_string(), Symbol::Blank));

        let table = TransitionTable::new(
            "No leading carry",
            base.states().clone(),
            base.start(),
            base.accepting().clone(),
            transitions,
        )
        .unwrap();

        assert!(run_machine(init_machine(&table, "111").unwrap()).is_none());
        assert!(run_machine(init_machine(&table, "101").unwrap()).is_some());
    }

    #[test]
    fn test_run_rejects_when_done_is_unreachable() {
        let base = binary_increment();
        let mut transitions = base.transitions();
        transitions.remove(&("propagate-carry".to_string(), Symbol::Char('0')));
        transitions.remove(&("propagate-carry".to_string(), Symbol::Blank));

        let table = TransitionTable::new(
            "Carry never settles",
            base.states().clone(),
            base.start(),
            base.accepting().clone(),
            transitions,
        )
        .expect("unreachable accepting state is still a valid table");

        assert!(run_machine(init_machine(&table, "101").unwrap()).is_none());
        assert_eq!(
            init_machine(&table, "101").unwrap().run(),
            Outcome::Rejected {
                state: "propagate-carry".to_string()
            }
        );
    }

    #[test]
    fn test_run_bounded() {
        let table = binary_increment();

        // "1" takes exactly 4 transitions
        let outcome = init_machine(&table, "1").unwrap().run_bounded(4).unwrap();
        assert_eq!(outcome.word().as_deref(), Some("10"));

        let result = init_machine(&table, "1").unwrap().run_bounded(3);
        assert_eq!(result, Err(MachineError::StepLimitExceeded(3)));
    }

    #[test]
    fn test_advance_respects_budget() {
        let table = binary_increment();
        let mut machine = init_machine(&table, "1").unwrap();

        assert_eq!(machine.advance(0), Step::Continue);
        assert_eq!(machine.step_count(), 0);

        assert_eq!(machine.advance(3), Step::Continue);
        assert_eq!(machine.step_count(), 3);
        assert!(!machine.is_halted());

        assert_eq!(machine.advance(1), Step::Halt);
        assert_eq!(machine.step_count(), 4);
        assert!(machine.is_halted());

        // A halted machine stays put.
        assert_eq!(machine.advance(10), Step::Halt);
        assert_eq!(machine.step_count(), 4);
    }

    #[test]
    fn test_run_bounded_runaway_stops_at_budget() {
        let table = runaway_table();
        let mut machine = init_machine(&table, "").unwrap();

        assert_eq!(machine.advance(100), Step::Continue);
        assert_eq!(machine.step_count(), 100);
        assert_eq!(machine.head(), 100);
    }

    #[test]
    fn test_run_bounded_runaway() {
        let table = runaway_table();
        let result = init_machine(&table, "").unwrap().run_bounded(100);
        assert_eq!(result, Err(MachineError::StepLimitExceeded(100)));
    }

    #[test]
    fn test_reset() {
        let table = binary_increment();
        let mut machine = init_machine(&table, "11").unwrap();

        while machine.step() == Step::Continue {}
        assert_eq!(machine.state(), "done");

        machine.reset();
        assert_eq!(machine, init_machine(&table, "11").unwrap());
    }
}
