//! Errors raised while running a rule command.

// See `parser::error` for why these attributes are needed.
#![allow(
    clippy::allow_attributes,
    reason = "version-dependent lint false positive from derive macros"
)]
#![allow(unused_assignments, reason = "derive macro expansion")]

use miette::Diagnostic;
use std::io;
use thiserror::Error;

/// A command could not be started or reported failure.
#[derive(Debug, Error, Diagnostic)]
pub enum CommandError {
    /// The shell could not be spawned.
    #[error("failed to start `{command}`")]
    #[diagnostic(code(mymake::exec::spawn))]
    Spawn {
        /// Command text as written in the rule file.
        command: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The command exited unsuccessfully.
    #[error("command `{command}` failed with {}", describe_status(*.status))]
    #[diagnostic(code(mymake::exec::exit))]
    Exit {
        /// Command text as written in the rule file.
        command: String,
        /// Exit code, or `None` when terminated by a signal.
        status: Option<i32>,
    },
}

impl CommandError {
    /// Command text that failed.
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. } | Self::Exit { command, .. } => command,
        }
    }
}

fn describe_status(status: Option<i32>) -> String {
    status.map_or_else(|| "a signal".to_owned(), |code| format!("exit code {code}"))
}
