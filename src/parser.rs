//! This module provides the parser for `.tm` transition table files, utilizing the `pest` crate.
//! Parsed tables are validated by `TransitionTable::new` before being returned.

use crate::{
    table::TransitionTable,
    types::{Action, MachineError, Move, Symbol, MAX_TABLE_SIZE},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::{HashMap, HashSet};

/// Derives a `PestParser` for the table grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TableParser;

type Transitions = HashMap<(String, Symbol), Action>;

/// Parses a table definition into a validated `TransitionTable`.
///
/// # Returns
///
/// * `Ok(TransitionTable)` if the input is syntactically valid and describes a well-formed table.
/// * `Err(MachineError::ParseError)` on syntax errors, duplicate sections or duplicate rules.
/// * `Err(MachineError::ValidationError)` if a required section is missing or the table is
///   malformed.
pub fn parse(input: &str) -> Result<TransitionTable, MachineError> {
    if input.len() > MAX_TABLE_SIZE {
        return Err(MachineError::ValidationError(format!(
            "Table definition is {} bytes, the limit is {}",
            input.len(),
            MAX_TABLE_SIZE
        )));
    }

    let root = TableParser::parse(Rule::program, input.trim())
        .map_err(|e| MachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| MachineError::ValidationError("Empty table definition".to_string()))?;

    parse_program(root)
}

/// Collects the sections of a `program` pair and builds the table.
fn parse_program(pair: Pair<Rule>) -> Result<TransitionTable, MachineError> {
    let mut name: Option<String> = None;
    let mut start: Option<String> = None;
    let mut accepting: Option<HashSet<String>> = None;
    let mut states: Option<HashSet<String>> = None;
    let mut transitions: Option<Transitions> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_inner_string(p).trim().to_string()),
            Rule::start => start = Some(parse_inner_string(p)),
            Rule::accept => accepting = Some(parse_state_list(p)),
            Rule::states => states = Some(parse_state_list(p)),
            Rule::rules => transitions = Some(parse_rules(p)?),
            _ => {} // EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let start = check_required_rule(start, "start")?;
    let transitions = check_required_rule(transitions, "rules")?;
    let accepting = accepting.unwrap_or_default();
    let states = states.unwrap_or_else(|| derive_states(&start, &accepting, &transitions));

    TransitionTable::new(name, states, start, accepting, transitions)
}

/// Parses the `rules:` section.
///
/// Each block contributes its state even when it has no actions, so halting states
/// can be listed explicitly. A `(state, symbol)` pair may appear only once.
fn parse_rules(pair: Pair<Rule>) -> Result<Transitions, MachineError> {
    let mut transitions = HashMap::new();
    let mut blocks = HashSet::new();

    for block in pair.into_inner() {
        let span = block.as_span();
        let mut pairs = block.into_inner();
        let state = parse_string(&mut pairs)?;

        if !blocks.insert(state.clone()) {
            return Err(parse_error(&format!("Duplicate rule block: {state}"), span));
        }

        for action in pairs {
            let span = action.as_span();
            let (read, action) = parse_action(action)?;

            if transitions.insert((state.clone(), read), action).is_some() {
                return Err(parse_error(
                    &format!("Duplicate transition for state {state} and symbol '{read}'"),
                    span,
                ));
            }
        }
    }

    Ok(transitions)
}

/// Parses `read -> write, MOVE, next`.
fn parse_action(pair: Pair<Rule>) -> Result<(Symbol, Action), MachineError> {
    let mut pairs = pair.into_inner();
    let read = parse_symbol(&parse_string(&mut pairs)?);
    let write = parse_symbol(&parse_string(&mut pairs)?);
    let direction = match pairs.next() {
        Some(p) => parse_direction(p)?,
        None => return Err(missing_token("direction")),
    };
    let next_state = parse_string(&mut pairs)?;

    Ok((
        read,
        Action {
            next_state,
            write,
            direction,
        },
    ))
}

/// Supports '<' or 'L' for Left, '>' or 'R' for Right, and '-', 'N' or 'S' for no movement.
fn parse_direction(pair: Pair<Rule>) -> Result<Move, MachineError> {
    let span = pair.as_span();
    match pair.as_str() {
        "<" | "L" => Ok(Move::Left),
        ">" | "R" => Ok(Move::Right),
        "-" | "N" | "S" => Ok(Move::None),
        other => Err(parse_error(&format!("Unsupported direction: {other}"), span)),
    }
}

/// Parses a quoted or unquoted single-character symbol; `_` is blank.
fn parse_symbol(input: &str) -> Symbol {
    match input.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(quoted) => quoted.chars().next().map_or(Symbol::Blank, Symbol::Char),
        None => input.chars().next().map_or(Symbol::Blank, Symbol::from_input),
    }
}

fn parse_state_list(pair: Pair<Rule>) -> HashSet<String> {
    pair.into_inner().map(|p| p.as_str().to_string()).collect()
}

/// Builds the state set from everything the table mentions.
fn derive_states(
    start: &str,
    accepting: &HashSet<String>,
    transitions: &Transitions,
) -> HashSet<String> {
    let mut states: HashSet<String> = accepting.clone();
    states.insert(start.to_string());

    for ((state, _), action) in transitions {
        states.insert(state.clone());
        states.insert(action.next_state.clone());
    }

    states
}

/// Creates a `MachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> MachineError {
    MachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

fn missing_token(what: &str) -> MachineError {
    MachineError::ValidationError(format!("Malformed rule: missing {what}"))
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Extracts the string content of the next `Pair` in a `Pairs` iterator.
fn parse_string(pairs: &mut Pairs<Rule>) -> Result<String, MachineError> {
    pairs
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| missing_token("token"))
}

/// Checks that a section has not already been declared.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), MachineError> {
    if !matches!(
        rule,
        Rule::name | Rule::start | Rule::accept | Rule::states | Rule::rules
    ) {
        return Ok(());
    }

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, MachineError> {
    value.ok_or_else(|| MachineError::ValidationError(format!("Missing '{name}' section")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INCREMENT: &str = r#"
name: Binary increment
start: rightmost-digit
accept: done
rules:
  rightmost-digit:
    0 -> 0, R, rightmost-digit
    1 -> 1, R, rightmost-digit
    _ -> _, L, propagate-carry
  propagate-carry:
    0 -> 1, N, done
    1 -> 0, L, propagate-carry
    _ -> 1, N, done
  done:
"#;

    #[test]
    fn test_parse_simple_table() {
        let table = parse(INCREMENT).unwrap();

        assert_eq!(table.name(), "Binary increment");
        assert_eq!(table.start(), "rightmost-digit");
        assert!(table.is_accepting("done"));
        assert_eq!(table.states().len(), 3);
        assert_eq!(table.transitions().len(), 6);
        assert_eq!(
            table.lookup("rightmost-digit", Symbol::Blank),
            Some(&Action::new("propagate-carry", Symbol::Blank, Move::Left))
        );
    }

    #[test]
    fn test_parse_matches_builtin() {
        let table = parse(INCREMENT).unwrap();
        let builtin = crate::programs::binary_increment();

        assert_eq!(table.states(), builtin.states());
        assert_eq!(table.accepting(), builtin.accepting());
        assert_eq!(table.transitions(), builtin.transitions());
    }

    #[test]
    fn test_parse_with_comments_and_arrows() {
        let input = r#"
# flips the first cell
name: Flip   # trailing comment
start: q0
accept: q1

rules:
  q0:
    # comment between rules
    0 -> 1, >, q1
    1 -> 0, -, q1
  q1:
"#;
        let table = parse(input).unwrap();

        assert_eq!(table.name(), "Flip");
        assert_eq!(
            table.lookup("q0", Symbol::Char('0')),
            Some(&Action::new("q1", Symbol::Char('1'), Move::Right))
        );
        assert_eq!(
            table.lookup("q0", Symbol::Char('1')),
            Some(&Action::new("q1", Symbol::Char('0'), Move::None))
        );
    }

    #[test]
    fn test_parse_quoted_symbols() {
        let input = r#"
name: Quoted
start: a
accept: b
rules:
  a:
    ',' -> '_', L, b
"#;
        let table = parse(input).unwrap();

        assert_eq!(
            table.lookup("a", Symbol::Char(',')),
            Some(&Action::new("b", Symbol::Char('_'), Move::Left))
        );
    }

    #[test]
    fn test_parse_explicit_states() {
        let input = r#"
name: Explicit
states: a, b
start: a
accept: b
rules:
  a:
    x -> x, R, b
"#;
        let table = parse(input).unwrap();
        assert_eq!(table.states().len(), 2);
    }

    #[test]
    fn test_parse_explicit_states_missing_accepting() {
        let input = r#"
name: Explicit
states: a
start: a
accept: b
rules:
  a:
    x -> x, R, a
"#;
        let result = parse(input);
        assert!(matches!(
            result,
            Err(MachineError::ValidationError(msg)) if msg.contains("Accepting")
        ));
    }

    #[test]
    fn test_parse_duplicate_section() {
        let input = r#"
name: One
name: Two
start: a
rules:
  a:
"#;
        let result = parse(input);
        assert!(matches!(result, Err(MachineError::ParseError(_))));
    }

    #[test]
    fn test_parse_missing_name() {
        let input = r#"
start: a
rules:
  a:
"#;
        let result = parse(input);
        assert!(matches!(
            result,
            Err(MachineError::ValidationError(msg)) if msg.contains("'name'")
        ));
    }

    #[test]
    fn test_parse_missing_start() {
        let input = r#"
name: No start
rules:
  a:
"#;
        let result = parse(input);
        assert!(matches!(
            result,
            Err(MachineError::ValidationError(msg)) if msg.contains("'start'")
        ));
    }

    #[test]
    fn test_parse_missing_rules() {
        let input = r#"
name: No rules
start: a
"#;
        assert!(matches!(parse(input), Err(MachineError::ParseError(_))));
    }

    #[test]
    fn test_parse_duplicate_transition() {
        let input = r#"
name: Nondeterministic
start: a
rules:
  a:
    0 -> 1, R, a
    0 -> 0, L, a
"#;
        let result = parse(input);
        match result {
            Err(MachineError::ParseError(e)) => {
                assert!(e.to_string().contains("Duplicate transition"));
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_duplicate_block() {
        let input = r#"
name: Split
start: a
rules:
  a:
    0 -> 1, R, a
  a:
    1 -> 0, L, a
"#;
        assert!(matches!(parse(input), Err(MachineError::ParseError(_))));
    }

    #[test]
    fn test_parse_unsupported_direction() {
        let input = r#"
name: Bad move
start: a
rules:
  a:
    0 -> 1, U, a
"#;
        assert!(matches!(parse(input), Err(MachineError::ParseError(_))));
    }

    #[test]
    fn test_parse_too_large() {
        let input = "#".repeat(MAX_TABLE_SIZE + 1);
        assert!(matches!(parse(&input), Err(MachineError::ValidationError(_))));
    }
}
