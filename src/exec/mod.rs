//! Command execution.
//!
//! The planner only sees the [`CommandRunner`] trait, so tests can record or
//! script command outcomes without spawning processes. [`ShellRunner`] is the
//! production implementation: it hands each command line to the platform
//! shell, waits for it, and echoes the command text once it has succeeded.

mod error;

pub use error::CommandError;

use camino::Utf8PathBuf;
use std::io::Write;
use std::process::Command;
use tracing::{info, warn};

#[cfg(windows)]
const SHELL: &str = "cmd";
#[cfg(windows)]
const SHELL_ARGS: &[&str] = &["/C"];

#[cfg(not(windows))]
const SHELL: &str = "sh";
#[cfg(not(windows))]
const SHELL_ARGS: &[&str] = &["-c"];

/// Executes one command line to completion.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run `command` and block until it finishes.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the command cannot be started or exits
    /// unsuccessfully.
    fn run(&mut self, command: &str) -> Result<(), CommandError>;
}

/// Runs commands through `sh -c` (or `cmd /C` on Windows).
///
/// Child processes inherit the standard streams. There is no timeout: a hung
/// command blocks the build.
#[derive(Debug)]
pub struct ShellRunner<W> {
    echo: W,
    directory: Option<Utf8PathBuf>,
}

impl<W: Write> ShellRunner<W> {
    /// Create a runner that echoes successful commands to `echo`.
    pub const fn new(echo: W) -> Self {
        Self {
            echo,
            directory: None,
        }
    }

    /// Run commands with `dir` as their working directory.
    #[must_use]
    pub fn in_directory(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self
    }

    /// Recover the echo sink.
    pub fn into_inner(self) -> W {
        self.echo
    }
}

impl<W: Write> CommandRunner for ShellRunner<W> {
    fn run(&mut self, command: &str) -> Result<(), CommandError> {
        let mut cmd = Command::new(SHELL);
        cmd.args(SHELL_ARGS).arg(command);
        if let Some(dir) = &self.directory {
            cmd.current_dir(dir);
        }
        info!(command, "running command");
        let status = cmd.status().map_err(|source| CommandError::Spawn {
            command: command.to_owned(),
            source,
        })?;
        if !status.success() {
            return Err(CommandError::Exit {
                command: command.to_owned(),
                status: status.code(),
            });
        }
        if let Err(err) = writeln!(self.echo, "{command}").and_then(|()| self.echo.flush()) {
            warn!("failed to echo command: {err}");
        }
        Ok(())
    }
}
