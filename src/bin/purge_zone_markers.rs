use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use filekit::core::telemetry::logging::init_logging;
use filekit::services::fs::purge::{purge_zone_markers, ZONE_MARKER_SUFFIX};

/// Recursively delete Zone.Identifier marker files under a directory.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory tree to sweep.
    root: PathBuf,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let report = match purge_zone_markers(&cli.root) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    for path in &report.removed {
        println!("Removed: {}", path.display());
    }
    for (path, err) in &report.failed {
        eprintln!("Error removing {}: {err}", path.display());
    }
    println!(
        "Removed {} '{}' marker file(s) under {}",
        report.removed.len(),
        ZONE_MARKER_SUFFIX,
        cli.root.display()
    );

    // Per-file failures were reported above; only a failed root check is
    // a failed run.
    ExitCode::SUCCESS
}
