//! clink: dispatch prompts to installed command-line AI agents.
//!
//! This is the main entry point for the `clink` CLI. It parses arguments,
//! dispatches to the appropriate command handler, and maps both errors and
//! invocation outcomes to exit codes.

mod cli;
mod commands;

use cli::Cli;
use clink::logging;
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
