#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;

use std::process;

use crate::command::Outcome;
use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "tessera_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "tessera_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "tessera_cli::command";

fn main() {
    let error = match run() {
        Ok(outcome) => process::exit(outcome.exit_code()),
        Err(error) => error,
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %error,
            "command failed"
        );
    }

    eprintln!("Error: {error:#}");
    process::exit(Outcome::ERROR_EXIT_CODE);
}

/// Main application entry point.
fn run() -> anyhow::Result<Outcome> {
    let cli = Cli::init();

    cli.telemetry.init_tracing()?;
    cli.log();
    cli.validate()?;

    cli.command.execute(cli.format)
}
