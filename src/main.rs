//! Application entry point.
//!
//! Parses command-line arguments and delegates execution to [`runner::run`].

use mymake::{cli::Cli, runner};
use std::io;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;

fn main() -> ExitCode {
    let cli = Cli::parse_with_default();
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    fmt()
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
    let mut stdout = io::stdout().lock();
    match runner::run(&cli, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
