//! Dependency graph storage.
//!
//! Nodes live in an arena owned by [`DependencyGraph`] and are addressed by
//! [`NodeId`]. Edges are plain id lists, so the graph owns every node and no
//! edge owns anything. Names map to ids through an insertion-ordered
//! [`IndexMap`], which keeps iteration order equal to the order in which names
//! first appeared in the rule file.
//!
//! ```
//! use mymake::graph::DependencyGraph;
//!
//! let mut graph = DependencyGraph::default();
//! let app = graph.create_node("app", true);
//! let obj = graph.create_node("main.o", false);
//! graph.add_edge(app, obj);
//! graph.add_edge(app, obj);
//! assert_eq!(graph.node(app).dependencies(), &[obj]);
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::time::SystemTime;

/// Handle to a node stored in a [`DependencyGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Per-run traversal marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitState {
    /// Not reached yet in the current pass.
    #[default]
    Unvisited,
    /// On the current traversal path; meeting it again means a cycle.
    Visiting,
    /// Fully evaluated (and rebuilt if it was stale).
    Done,
}

/// A target or a bare dependency.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    commands: Vec<String>,
    dependencies: Vec<NodeId>,
    declared_target: bool,
    pub(crate) state: VisitState,
    pub(crate) exists: bool,
    pub(crate) modified: Option<SystemTime>,
    pub(crate) must_rebuild: bool,
}

impl Node {
    fn new(name: &str, declared_target: bool) -> Self {
        Self {
            name: name.to_owned(),
            commands: Vec::new(),
            dependencies: Vec::new(),
            declared_target,
            state: VisitState::Unvisited,
            exists: false,
            modified: None,
            must_rebuild: false,
        }
    }

    /// Name of the node, which doubles as the path probed on disk.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Commands in declaration order.
    #[must_use]
    pub const fn commands(&self) -> &[String] {
        self.commands.as_slice()
    }

    /// Dependency edges in declaration order.
    #[must_use]
    pub const fn dependencies(&self) -> &[NodeId] {
        self.dependencies.as_slice()
    }

    /// Whether the node appeared on the left-hand side of a rule.
    #[must_use]
    pub const fn is_declared_target(&self) -> bool {
        self.declared_target
    }

    /// Traversal state from the most recent planning pass.
    #[must_use]
    pub const fn state(&self) -> VisitState {
        self.state
    }

    /// Whether the last probe found the file.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.exists
    }

    /// Modification time recorded by the last successful probe.
    #[must_use]
    pub const fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Whether the last planning pass decided this node was stale.
    #[must_use]
    pub const fn must_rebuild(&self) -> bool {
        self.must_rebuild
    }

    const fn reset(&mut self) {
        self.state = VisitState::Unvisited;
        self.exists = false;
        self.modified = None;
        self.must_rebuild = false;
    }
}

/// Arena of nodes plus a name index.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: IndexMap<String, NodeId>,
    default_root: Option<NodeId>,
}

impl DependencyGraph {
    /// Find the node registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Register a fresh node with no commands or edges.
    ///
    /// If `name` is already registered the existing id is returned and the
    /// node is left untouched; `declared_target` is ignored in that case. Use
    /// [`declare_target`](Self::declare_target) to promote an existing node.
    pub fn create_node(&mut self, name: &str, declared_target: bool) -> NodeId {
        if let Some(existing) = self.lookup(name) {
            return existing;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name, declared_target));
        self.index.insert(name.to_owned(), id);
        id
    }

    /// Mark `id` as appearing on a rule's left-hand side.
    ///
    /// The first node declared this way becomes the default root.
    pub fn declare_target(&mut self, id: NodeId) {
        self.node_mut(id).declared_target = true;
        self.default_root.get_or_insert(id);
    }

    /// Add an edge from `from` to `to` unless one already exists.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        let deps = &mut self.node_mut(from).dependencies;
        if !deps.contains(&to) {
            deps.push(to);
        }
    }

    /// Append a command to the node's command list.
    pub fn append_command(&mut self, id: NodeId, text: &str) {
        self.node_mut(id).commands.push(text.to_owned());
    }

    /// Borrow the node behind `id`.
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "NodeId values are only minted by this graph"
    )]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "NodeId values are only minted by this graph"
    )]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// The first declared target, used when no target is requested.
    #[must_use]
    pub const fn default_root(&self) -> Option<NodeId> {
        self.default_root
    }

    /// Iterate over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx), node))
    }

    /// Number of nodes, targets and bare dependencies alike.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no rule has been parsed into the graph.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Clear every node's per-run state before a planning pass.
    pub fn reset_traversal(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }

    /// Produce a serialisable view of the graph structure.
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            default_target: self.default_root.map(|id| self.node(id).name.clone()),
            nodes: self
                .nodes
                .iter()
                .map(|node| NodeSummary {
                    name: node.name.clone(),
                    target: node.declared_target,
                    dependencies: node
                        .dependencies
                        .iter()
                        .map(|dep| self.node(*dep).name.clone())
                        .collect(),
                    commands: node.commands.clone(),
                })
                .collect(),
        }
    }
}

/// Renders declared targets back into rule-file syntax.
///
/// Re-parsing the output yields a graph with the same nodes, edges and
/// commands.
impl fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for node in self.nodes.iter().filter(|n| n.declared_target) {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{} :", node.name)?;
            for dep in &node.dependencies {
                write!(f, " {}", self.node(*dep).name)?;
            }
            writeln!(f)?;
            for command in &node.commands {
                writeln!(f, "\t{command}")?;
            }
        }
        Ok(())
    }
}

/// Structure-only view of a [`DependencyGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    /// Name of the default root, if any target was declared.
    pub default_target: Option<String>,
    /// Every node in insertion order.
    pub nodes: Vec<NodeSummary>,
}

/// Structure-only view of a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    /// Node name.
    pub name: String,
    /// Whether the node was declared on a rule's left-hand side.
    pub target: bool,
    /// Dependency names in declaration order.
    pub dependencies: Vec<String>,
    /// Commands in declaration order.
    pub commands: Vec<String>,
}
