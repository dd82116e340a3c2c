//! Threat model:
//! - The attacker can read and modify the container at rest.
//! - The attacker has unlimited offline time against the header and payload.
//! - Passwords are only ever accepted interactively or over stdin, never via
//!   argv or the environment, so they cannot leak into process listings.

use clap::Parser;
use std::process::ExitCode;

use binlock::cli::Cli;
use binlock::commands;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(1)
        }
    }
}
