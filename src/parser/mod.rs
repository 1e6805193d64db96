//! Rule-file parsing.
//!
//! A rule file is line oriented. Lines starting with a tab are commands for
//! the most recently declared target, blank lines are ignored, and every other
//! line is a target line of the form `name : dep1 dep2 ...`. Parsing stops at
//! the first malformed line; the partially built graph is dropped with the
//! error.
//!
//! ```
//! use mymake::parser;
//!
//! let graph = parser::parse("app : main.o\n\tcc -o app main.o\nmain.o :\n\ttouch main.o\n")?;
//! let app = graph.default_root().expect("root");
//! assert_eq!(graph.node(app).name(), "app");
//! assert_eq!(graph.node(app).commands(), &["cc -o app main.o".to_owned()]);
//! # Ok::<(), mymake::parser::ParseError>(())
//! ```

mod error;
mod normalize;

pub use error::ParseError;
pub use normalize::normalize;

use crate::graph::{DependencyGraph, NodeId};
use tracing::debug;

/// Parse rule-file text into a [`DependencyGraph`].
///
/// Both `\n` and `\r\n` line endings are accepted.
///
/// # Errors
///
/// Returns [`ParseError`] when a target line has the wrong number of colons,
/// a command precedes every target, or a target with dependencies is declared
/// a second time.
pub fn parse(text: &str) -> Result<DependencyGraph, ParseError> {
    let mut parser = RuleParser::default();
    for (idx, line) in text.lines().enumerate() {
        parser.feed(idx + 1, line)?;
    }
    Ok(parser.finish())
}

/// Incremental parser state: the graph under construction and the target that
/// receives subsequent command lines.
#[derive(Debug, Default)]
pub struct RuleParser {
    graph: DependencyGraph,
    current: Option<NodeId>,
}

impl RuleParser {
    /// Classify and apply a single line (without its terminator).
    ///
    /// # Errors
    ///
    /// See [`parse`].
    pub fn feed(&mut self, number: usize, line: &str) -> Result<(), ParseError> {
        if let Some(rest) = line.strip_prefix('\t') {
            let target = self
                .current
                .ok_or(ParseError::CommandBeforeTarget { line: number })?;
            let command = rest.trim();
            if !command.is_empty() {
                self.graph.append_command(target, command);
            }
            return Ok(());
        }
        if line.trim().is_empty() {
            return Ok(());
        }
        let target = self.target_line(number, line)?;
        self.current = Some(target);
        Ok(())
    }

    /// Finish parsing and hand over the graph.
    #[must_use]
    pub fn finish(self) -> DependencyGraph {
        self.graph
    }

    fn target_line(&mut self, number: usize, line: &str) -> Result<NodeId, ParseError> {
        let found = line.matches(':').count();
        if found != 1 {
            return Err(ParseError::ColonCount {
                line: number,
                found,
            });
        }
        let normalized = normalize(line);
        let Some((lhs, rhs)) = normalized.split_once(':') else {
            return Err(ParseError::ColonCount {
                line: number,
                found: 0,
            });
        };
        let name = lhs.trim();
        if name.is_empty() {
            return Err(ParseError::MissingTargetName { line: number });
        }
        if name.contains(' ') {
            return Err(ParseError::MultipleTargetNames {
                line: number,
                names: name.to_owned(),
            });
        }

        let target = match self.graph.lookup(name) {
            Some(id) if !self.graph.node(id).dependencies().is_empty() => {
                return Err(ParseError::DuplicateTarget {
                    line: number,
                    name: name.to_owned(),
                });
            }
            Some(id) => id,
            None => self.graph.create_node(name, true),
        };
        self.graph.declare_target(target);

        for dep in rhs.split_whitespace() {
            let child = self
                .graph
                .lookup(dep)
                .unwrap_or_else(|| self.graph.create_node(dep, false));
            self.graph.add_edge(target, child);
        }
        debug!(
            rule = name,
            deps = self.graph.node(target).dependencies().len(),
            "parsed target line"
        );
        Ok(target)
    }
}
