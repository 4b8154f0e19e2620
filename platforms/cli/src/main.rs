use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use serde::Serialize;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use tmsim::{
    init_machine, Machine, MachineError, Outcome, ProgramManager, Step, TableLoader,
    TransitionTable, BINARY_INCREMENT, MAX_EXECUTION_STEPS,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmsim-cli 101 111
  tmsim-cli --debug 1011
  tmsim-cli --table tables/binary-increment.tm 0
  printf '1\\n10\\n' | tmsim-cli --json")]
struct Cli {
    /// Input words, one machine per word. Read from stdin (one per line) when omitted.
    words: Vec<String>,

    /// Transition table file (.tm) to use instead of a built-in table
    #[clap(short, long)]
    table: Option<PathBuf>,

    /// Name of the built-in table to use
    #[clap(short, long, default_value = BINARY_INCREMENT)]
    builtin: String,

    /// Give up on a word after this many transitions
    #[clap(short, long, default_value_t = MAX_EXECUTION_STEPS)]
    max_steps: usize,

    /// Print the machine after each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Print one JSON report per word
    #[clap(long)]
    json: bool,

    /// List the built-in tables and exit
    #[clap(long)]
    list: bool,

    /// Log filter used when RUST_LOG is not set
    #[clap(long, default_value = "warn")]
    log_level: String,
}

/// The per-word result printed in `--json` mode.
#[derive(Serialize)]
struct Report<'a> {
    table: &'a str,
    word: &'a str,
    output: Option<String>,
    outcome: &'a Outcome,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if cli.list {
        for name in ProgramManager::list_program_names() {
            println!("{name}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let table = load_table(&cli)?;
    let words = read_words(&cli)?;
    tracing::info!(table = table.name(), words = words.len(), "running");

    let mut all_accepted = true;
    for word in &words {
        let machine = init_machine(&table, word)
            .with_context(|| format!("cannot start machine on word '{word}'"))?;

        let outcome = if cli.debug {
            run_debug(machine, cli.max_steps)
        } else {
            machine.run_bounded(cli.max_steps)
        }
        .with_context(|| format!("machine did not halt on word '{word}'"))?;

        all_accepted &= outcome.is_accepted();
        print_outcome(&cli, &table, word, &outcome)?;
    }

    Ok(if all_accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Loads the table named on the command line, preferring `--table` over `--builtin`.
fn load_table(cli: &Cli) -> Result<TransitionTable> {
    match &cli.table {
        Some(path) => TableLoader::load_table(path)
            .with_context(|| format!("failed to load table from {}", path.display())),
        None => ProgramManager::get_program_by_name(&cli.builtin)
            .with_context(|| format!("unknown built-in table '{}'", cli.builtin)),
    }
}

/// Returns the words given as arguments, or the lines of stdin when none were given.
fn read_words(cli: &Cli) -> Result<Vec<String>> {
    if !cli.words.is_empty() {
        return Ok(cli.words.clone());
    }

    if atty::is(atty::Stream::Stdin) {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "no input words: pass them as arguments or pipe them on stdin",
            )
            .exit();
    }

    words_from_lines(io::stdin().lock()).context("failed to read words from stdin")
}

/// Reads one word per line, trimming surrounding whitespace.
fn words_from_lines(reader: impl BufRead) -> io::Result<Vec<String>> {
    reader
        .lines()
        .map(|line| line.map(|l| l.trim().to_string()))
        .collect()
}

/// Runs the machine like `Machine::run_bounded`, rendering every configuration.
fn run_debug(mut machine: Machine<'_>, max_steps: usize) -> Result<Outcome, MachineError> {
    println!("{machine}\n");

    for _ in 0..max_steps {
        match machine.step() {
            Step::Continue => println!("Step: {}\n{machine}\n", machine.step_count()),
            // A halted machine returns its outcome without further transitions.
            Step::Halt => return Ok(machine.run()),
        }
    }

    if machine.is_halted() {
        return Ok(machine.run());
    }

    Err(MachineError::StepLimitExceeded(max_steps))
}

fn print_outcome(
    cli: &Cli,
    table: &TransitionTable,
    word: &str,
    outcome: &Outcome,
) -> Result<()> {
    if cli.json {
        let report = Report {
            table: table.name(),
            word,
            output: outcome.word(),
            outcome,
        };
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    match outcome {
        Outcome::Accepted(_) => println!("{}", outcome.word().unwrap_or_default()),
        Outcome::Rejected { state } => println!("rejected in state {state}"),
    }

    Ok(())
}
