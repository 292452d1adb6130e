//! `zoo` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments, resolve configuration, initialize logging.
//! - Dispatch to one command and map failures to a non-zero exit code.

mod cli;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    match cli::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
