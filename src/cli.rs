//! Command line interface definition using clap.
//!
//! `mymake [-f FILE] [-C DIR] [TARGET]` builds `TARGET` (or the first target in
//! the rule file). The `build` and `graph` subcommands spell the same thing
//! out explicitly and expose the parsed graph for inspection.

use camino::Utf8PathBuf;
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::ffi::OsString;

/// Rule file read when `--file` is not given.
pub const DEFAULT_RULE_FILE: &str = "myMakefile";

/// A minimal incremental build engine modelled on make.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the rule file to use.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_RULE_FILE)]
    pub file: Utf8PathBuf,

    /// Resolve the rule file, probe files and run commands in this directory.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<Utf8PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Target to build when no subcommand is given.
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,

    /// Optional subcommand to execute; defaults to `build` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Parse command-line arguments, providing `build` as the default command.
    ///
    /// Exits with a usage error when parsing fails.
    #[must_use]
    pub fn parse_with_default() -> Self {
        Self::try_parse_with_default_from(std::env::args_os()).unwrap_or_else(|err| err.exit())
    }

    /// Parse `args` and apply [`with_default_command`](Self::with_default_command).
    ///
    /// # Errors
    ///
    /// Returns a clap error for invalid arguments, including a bare `TARGET`
    /// given alongside a subcommand (`mymake app build`), which would
    /// otherwise leave the positional target unused.
    pub fn try_parse_with_default_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Self::try_parse_from(args)?;
        if let (Some(target), Some(_)) = (&cli.target, &cli.command) {
            return Err(Self::command().error(
                ErrorKind::ArgumentConflict,
                format!("target `{target}` cannot be combined with a subcommand; use `build {target}`"),
            ));
        }
        Ok(cli.with_default_command())
    }

    /// Apply the default command if none was specified.
    ///
    /// A bare `TARGET` positional becomes `build TARGET`.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Build(BuildArgs {
                target: self.target.take(),
            }));
        }
        self
    }

    /// Location of the rule file after applying `--directory`.
    #[must_use]
    pub fn rule_file(&self) -> Utf8PathBuf {
        self.directory
            .as_ref()
            .map_or_else(|| self.file.clone(), |dir| dir.join(&self.file))
    }
}

/// Arguments accepted by the `build` command.
#[derive(Debug, Args, PartialEq, Eq, Clone)]
pub struct BuildArgs {
    /// Target to bring up to date; defaults to the first declared target.
    pub target: Option<String>,
}

/// Arguments accepted by the `graph` command.
#[derive(Debug, Args, PartialEq, Eq, Clone)]
pub struct GraphArgs {
    /// Print the graph as JSON instead of rule-file syntax.
    #[arg(long)]
    pub json: bool,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Build a target and whatever it depends on.
    Build(BuildArgs),

    /// Print the parsed dependency graph.
    Graph(GraphArgs),
}
