//! Incremental build planning and execution.
//!
//! [`BuildPlanner`] walks the graph depth first in post-order from a root
//! target. Every node is probed on entry, its dependencies are fully resolved
//! (and rebuilt if needed) in declaration order, and only then is the node
//! itself judged stale and rebuilt. A node is stale when its file is missing,
//! a dependency is missing, or a dependency is strictly newer.
//!
//! The walk keeps an explicit stack of `(node, next dependency)` frames, so
//! chain depth is bounded by heap rather than by the call stack. A dependency
//! that is still [`VisitState::Visiting`] when reached again closes a cycle;
//! the offending edge is reported and ignored and the walk continues.

mod error;

pub use error::BuildError;

use crate::exec::CommandRunner;
use crate::graph::{DependencyGraph, NodeId, VisitState};
use crate::probe::FileSystemProbe;
use camino::Utf8Path;
use tracing::{debug, info, warn};

/// A dependency edge that closed a cycle and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleEdge {
    /// Node whose dependency list contains the edge.
    pub from: String,
    /// Ancestor the edge points back to.
    pub to: String,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Requested root target.
    pub target: String,
    /// Commands executed, in order.
    pub executed: Vec<String>,
    /// Cycle edges encountered and ignored.
    pub cycles: Vec<CycleEdge>,
}

impl BuildReport {
    fn new(target: &str) -> Self {
        Self {
            target: target.to_owned(),
            executed: Vec::new(),
            cycles: Vec::new(),
        }
    }

    /// Whether the build ran no commands at all.
    #[must_use]
    pub const fn is_up_to_date(&self) -> bool {
        self.executed.is_empty()
    }
}

/// Resolve the root to build: `name` if given, else the first declared target.
///
/// # Errors
///
/// Returns [`BuildError::NotFound`] for an unknown name and
/// [`BuildError::NoTargets`] when the graph declares no target.
pub fn select_target(graph: &DependencyGraph, name: Option<&str>) -> Result<NodeId, BuildError> {
    match name {
        Some(target) => graph.lookup(target).ok_or_else(|| BuildError::NotFound {
            target: target.to_owned(),
        }),
        None => graph.default_root().ok_or(BuildError::NoTargets),
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    next: usize,
}

/// Drives a post-order build over a [`DependencyGraph`].
#[derive(Debug)]
pub struct BuildPlanner<P, R> {
    probe: P,
    runner: R,
}

impl<P: FileSystemProbe, R: CommandRunner> BuildPlanner<P, R> {
    /// Combine a filesystem probe with a command runner.
    pub const fn new(probe: P, runner: R) -> Self {
        Self { probe, runner }
    }

    /// Borrow the command runner.
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Release the collaborators.
    pub fn into_parts(self) -> (P, R) {
        (self.probe, self.runner)
    }

    /// Bring `root` up to date, running the minimal set of commands.
    ///
    /// Traversal state is reset first, so the same graph can be built again.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when a plain dependency is missing, a target
    /// cannot be produced, or a command fails. Cycles are not errors; they are
    /// listed in [`BuildReport::cycles`].
    pub fn build(
        &mut self,
        graph: &mut DependencyGraph,
        root: NodeId,
    ) -> Result<BuildReport, BuildError> {
        graph.reset_traversal();
        let mut report = BuildReport::new(graph.node(root).name());
        let mut stack = Vec::new();
        self.enter(graph, root, &mut stack)?;

        while let Some(&Frame { node, next }) = stack.last() {
            let Some(&child) = graph.node(node).dependencies().get(next) else {
                self.finish(graph, node, &mut report)?;
                stack.pop();
                continue;
            };
            match graph.node(child).state() {
                VisitState::Unvisited => {
                    // Revisit this frame once the child is done.
                    self.enter(graph, child, &mut stack)?;
                    continue;
                }
                VisitState::Visiting => {
                    let edge = CycleEdge {
                        from: graph.node(node).name().to_owned(),
                        to: graph.node(child).name().to_owned(),
                    };
                    warn!(from = %edge.from, to = %edge.to, "dependency cycle detected; ignoring edge");
                    report.cycles.push(edge);
                }
                VisitState::Done => absorb(graph, node, child),
            }
            if let Some(frame) = stack.last_mut() {
                frame.next += 1;
            }
        }

        if report.is_up_to_date() {
            info!(root = %report.target, "nothing to do");
        }
        Ok(report)
    }

    fn enter(
        &self,
        graph: &mut DependencyGraph,
        id: NodeId,
        stack: &mut Vec<Frame>,
    ) -> Result<(), BuildError> {
        let node = graph.node_mut(id);
        node.state = VisitState::Visiting;
        match self.probe.probe(Utf8Path::new(node.name())) {
            Ok(modified) => {
                node.exists = true;
                node.modified = Some(modified);
            }
            Err(source) if !node.is_declared_target() => {
                return Err(BuildError::MissingLeaf {
                    name: node.name().to_owned(),
                    source,
                });
            }
            Err(err) => {
                debug!(node = node.name(), "target not built yet: {err}");
                node.must_rebuild = true;
            }
        }
        if !node.exists && node.dependencies().is_empty() && node.commands().is_empty() {
            return Err(BuildError::NoRecipe {
                name: node.name().to_owned(),
            });
        }
        stack.push(Frame { node: id, next: 0 });
        Ok(())
    }

    fn finish(
        &mut self,
        graph: &mut DependencyGraph,
        id: NodeId,
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        if graph.node(id).must_rebuild() {
            for command in graph.node(id).commands() {
                self.runner.run(command)?;
                report.executed.push(command.clone());
            }
            let node = graph.node_mut(id);
            match self.probe.probe(Utf8Path::new(node.name())) {
                Ok(modified) => {
                    node.exists = true;
                    node.modified = Some(modified);
                }
                Err(err) => {
                    debug!(node = node.name(), "target still missing after rebuild: {err}");
                    node.exists = false;
                    node.modified = None;
                }
            }
        }
        graph.node_mut(id).state = VisitState::Done;
        Ok(())
    }
}

/// Fold a finished dependency into its parent's staleness.
fn absorb(graph: &mut DependencyGraph, parent: NodeId, child: NodeId) {
    let (child_exists, child_modified) = {
        let dep = graph.node(child);
        (dep.exists(), dep.modified())
    };
    let node = graph.node_mut(parent);
    if node.must_rebuild {
        return;
    }
    // `None` sorts below any timestamp, and a parent without one is already
    // marked for rebuild above.
    if !child_exists || child_modified > node.modified {
        debug!(node = node.name(), "dependency is missing or newer");
        node.must_rebuild = true;
    }
}

#[cfg(test)]
mod tests;
