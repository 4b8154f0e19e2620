//! Text rendering of a machine configuration.

use crate::machine::Machine;
use crate::types::{Symbol, DISPLAY_BLANK_SYMBOL};
use std::fmt;

/// Renders the tape as a row of boxed cells followed by the state name, with a `^`
/// under the cell the head is on.
///
/// ```text
/// +---+---+---+
/// | 1 | 0 | 1 | rightmost-digit
/// +---+---+---+
///   ^
/// ```
///
/// The drawn range covers every materialized cell plus the head's cell.
pub fn render(machine: &Machine<'_>) -> String {
    let head = machine.head();
    let (left, right) = match machine.tape().bounds() {
        Some((left, right)) => (left.min(head), right.max(head)),
        None => (head, head),
    };

    let border = format!("+{}", "---+".repeat((right - left + 1) as usize));
    let cells: String = (left..=right)
        .map(|index| format!(" {} |", display_char(machine.tape().peek(index))))
        .collect();
    let marker = format!("{}^", " ".repeat(2 + 4 * (head - left) as usize));

    format!(
        "{border}\n|{cells} {state}\n{border}\n{marker}",
        state = machine.state()
    )
}

fn display_char(symbol: Symbol) -> char {
    match symbol {
        Symbol::Blank => DISPLAY_BLANK_SYMBOL,
        Symbol::Char(c) => c,
    }
}

impl fmt::Display for Machine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}
