use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use filekit::core::telemetry::logging::init_logging;
use filekit::models::table::SortMode;
use filekit::services::table::{sort_by_column, SortRequest};

/// Sort the rows of a delimited table file by one named column.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Table file to sort.
    input: PathBuf,

    /// Column to sort by.
    column: String,

    /// Write the sorted table here instead of overwriting the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Delimiter used in the table (default: detect from the first line).
    #[arg(short, long, value_parser = parse_delimiter)]
    delimiter: Option<u8>,
}

fn parse_delimiter(arg: &str) -> Result<u8, String> {
    if arg == "\\t" {
        return Ok(b'\t');
    }
    match arg.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(format!("'{arg}' is not a single ASCII character")),
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let request = SortRequest {
        input: cli.input,
        column: cli.column.clone(),
        output: cli.output,
        delimiter: cli.delimiter,
    };

    let outcome = match sort_by_column(&request) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if outcome.delimiter_detected {
        println!("Detected delimiter: '{}'", outcome.delimiter as char);
    }
    match outcome.mode {
        SortMode::Numeric => println!("Sorted numerically."),
        SortMode::Lexicographic => println!("Some values are not numeric; sorted as text."),
    }
    if outcome.in_place {
        println!(
            "Sorted '{}' by column '{}' ({} rows).",
            outcome.destination.display(),
            cli.column,
            outcome.rows
        );
    } else {
        println!("Sorted rows written to '{}'.", outcome.destination.display());
    }

    ExitCode::SUCCESS
}
