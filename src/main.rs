//! Guardrails: policy-driven violation detection for code review diffs.
//!
//! This is the main entry point for the `guardrails` CLI. It parses
//! arguments, installs diagnostics, dispatches to the appropriate command
//! handler, and handles errors with proper exit codes.

mod cli;
mod commands;

use cli::Cli;
use guardrails::logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    match commands::dispatch(cli) {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
