//! mymake core library.
//!
//! This library parses make-style rule files into a [`graph::DependencyGraph`]
//! and brings a requested target up to date by running the minimal, ordered
//! set of commands, judged by file modification times.
//!
//! ```no_run
//! use mymake::exec::ShellRunner;
//! use mymake::planner::{self, BuildPlanner};
//! use mymake::{parser, probe::StdFileSystem};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut graph = parser::parse("app : main.o\n\tcc -o app main.o\n")?;
//! let root = planner::select_target(&graph, None)?;
//! let mut planner = BuildPlanner::new(StdFileSystem::new(), ShellRunner::new(std::io::stdout()));
//! let report = planner.build(&mut graph, root)?;
//! if report.is_up_to_date() {
//!     println!("{} is up to date.", report.target);
//! }
//! # Ok(()) }
//! ```

pub mod cli;
pub mod exec;
pub mod graph;
pub mod parser;
pub mod planner;
pub mod probe;
pub mod runner;
