//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the rule file, parses it and then either builds a target or prints
//! the graph. Program output goes to the writer handed in by the caller;
//! diagnostics go through `tracing`.

use crate::cli::{BuildArgs, Cli, Commands, GraphArgs};
use crate::exec::ShellRunner;
use crate::graph::DependencyGraph;
use crate::planner::{self, BuildPlanner, BuildReport};
use crate::{parser, probe::StdFileSystem};
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use tracing::debug;

/// Execute the parsed [`Cli`] command, writing program output to `out`.
///
/// # Errors
///
/// Returns an error if the rule file cannot be read or parsed, the target
/// cannot be resolved, or the build fails.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let command = cli.command.clone().unwrap_or_else(|| {
        Commands::Build(BuildArgs {
            target: cli.target.clone(),
        })
    });
    let mut graph = load_graph(cli)?;
    match command {
        Commands::Build(args) => {
            let report = build(cli, &mut graph, &args, out)?;
            if report.is_up_to_date() {
                writeln!(out, "{} is up to date.", report.target).context("writing output")?;
            }
            Ok(())
        }
        Commands::Graph(args) => write_graph(&graph, &args, out),
    }
}

fn load_graph(cli: &Cli) -> Result<DependencyGraph> {
    let path = cli.rule_file();
    let text =
        fs::read_to_string(&path).with_context(|| format!("failed to read rule file {path}"))?;
    let graph = parser::parse(&text).with_context(|| format!("invalid rule file {path}"))?;
    debug!(path = %path, nodes = graph.len(), "parsed rule file");
    Ok(graph)
}

fn build<W: Write>(
    cli: &Cli,
    graph: &mut DependencyGraph,
    args: &BuildArgs,
    out: &mut W,
) -> Result<BuildReport> {
    let root = planner::select_target(graph, args.target.as_deref())?;
    let mut probe = StdFileSystem::new();
    let mut runner = ShellRunner::new(&mut *out);
    if let Some(dir) = &cli.directory {
        probe = StdFileSystem::rooted(dir.clone());
        runner = runner.in_directory(dir.clone());
    }
    let mut planner = BuildPlanner::new(probe, runner);
    let report = planner.build(graph, root)?;
    Ok(report)
}

fn write_graph<W: Write>(graph: &DependencyGraph, args: &GraphArgs, out: &mut W) -> Result<()> {
    if args.json {
        serde_json::to_writer_pretty(&mut *out, &graph.summary())
            .context("serialising graph")?;
        writeln!(out).context("writing output")?;
    } else {
        write!(out, "{graph}").context("writing output")?;
    }
    Ok(())
}
