#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that reads a coin track puzzle and reports how many
//! cells must change for the coin to rest within the target iteration count.

mod driver;
mod input;

use std::{
    fs,
    io::{self, Read},
    panic,
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use coin_track_core::RowPolicy;
use serde::Serialize;

use self::{
    driver::{Solution, SolverConfig},
    input::Puzzle,
};

/// Value printed whenever the puzzle cannot be solved.
const FAILURE_SENTINEL: i64 = -1;

/// Reads a coin track puzzle and prints the number of cells to rewrite.
#[derive(Debug, Parser)]
#[command(name = "coin-track", version)]
struct Cli {
    /// Puzzle file to read; standard input is used when omitted.
    input: Option<PathBuf>,
    /// Handling of rows whose length differs from the column count.
    #[arg(long, value_enum, default_value_t = RowPolicyArg::Lenient)]
    row_policy: RowPolicyArg,
    /// Writes the final grid to standard error.
    #[arg(long)]
    render: bool,
    /// Shape of the result written to standard output.
    #[arg(long, value_enum, default_value_t = ReportFormat::Plain)]
    report: ReportFormat,
    /// Raises log verbosity; repeat for trace output.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RowPolicyArg {
    /// Log mismatched rows and continue.
    Lenient,
    /// Reject mismatched rows.
    Strict,
}

impl From<RowPolicyArg> for RowPolicy {
    fn from(value: RowPolicyArg) -> Self {
        match value {
            RowPolicyArg::Lenient => Self::Lenient,
            RowPolicyArg::Strict => Self::Strict,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    /// A single integer.
    Plain,
    /// A JSON object with the result and diagnostics.
    Json,
}

/// Result written to standard output.
#[derive(Debug, Serialize)]
struct Report {
    result: i64,
    #[serde(flatten)]
    solution: Option<Solution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Report {
    fn success(solution: Solution) -> Self {
        Self {
            result: i64::try_from(solution.diff_count).unwrap_or(FAILURE_SENTINEL),
            solution: Some(solution),
            error: None,
        }
    }

    fn failure(error: String) -> Self {
        Self {
            result: FAILURE_SENTINEL,
            solution: None,
            error: Some(error),
        }
    }
}

/// Entry point for the coin track command-line interface.
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = SolverConfig {
        row_policy: cli.row_policy.into(),
    };

    let report = match panic::catch_unwind(|| run(cli.input.as_ref(), config)) {
        Ok(Ok(solution)) => Report::success(solution),
        Ok(Err(error)) => {
            log::error!("{error:#}");
            Report::failure(format!("{error:#}"))
        }
        Err(_) => {
            log::error!("solver panicked");
            Report::failure("solver panicked".to_owned())
        }
    };

    if cli.render {
        if let Some(solution) = &report.solution {
            eprintln!("{}", solution.grid);
        }
    }

    println!("{}", format_report(&report, cli.report));
}

fn format_report(report: &Report, format: ReportFormat) -> String {
    match format {
        ReportFormat::Plain => report.result.to_string(),
        ReportFormat::Json => serde_json::to_string(report).unwrap_or_else(|error| {
            log::error!("could not serialize the report: {error}");
            FAILURE_SENTINEL.to_string()
        }),
    }
}

fn run(input: Option<&PathBuf>, config: SolverConfig) -> Result<Solution> {
    let text = read_input(input)?;
    let puzzle = Puzzle::parse(&text).context("could not read the puzzle header")?;
    let solution = driver::solve(&puzzle, config).context("could not solve the puzzle")?;
    Ok(solution)
}

fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("could not read puzzle from {}", path.display())),
        None => {
            let mut text = String::new();
            let _ = io::stdin()
                .read_to_string(&mut text)
                .context("could not read puzzle from standard input")?;
            Ok(text)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
