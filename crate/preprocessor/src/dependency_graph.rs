//! Directed graph of include relationships rooted at the entry file.
//!
//! Nodes are arena-backed and keyed by resolved path, so a file included
//! from several places coalesces into one node; edges carry indices, never
//! owning references. Cycle detection is a three-color depth-first search.

use crate::source_reader::SourceReader;
use kasm_error::{ErrorCode, FatalError};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref INCLUDE: Regex = Regex::new(r#"^\s*%include\s+"([^"]+)"\s*$"#).unwrap();
}

const SOURCE_EXTENSION: &str = "kasm";

pub type NodeId = usize;

/// One file in the include graph
#[derive(Debug)]
pub struct DependencyNode {
    pub path: PathBuf,
    pub source: String,
    /// Include edges leaving this node, in scan order
    out_edges: Vec<NodeId>,
}

impl DependencyNode {
    pub fn edges(&self) -> &[NodeId] {
        &self.out_edges
    }

    /// Display name of the node (its resolved path)
    pub fn name(&self) -> String {
        self.path.display().to_string()
    }
}

/// DFS colors: unvisited, on the current stack, finished
#[derive(Debug, Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// The include dependency graph
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<DependencyNode>,
    index: HashMap<PathBuf, NodeId>,
    roots: Vec<NodeId>,
}

impl DependencyGraph {
    /// Builds the graph by depth-first scanning the root source.
    ///
    /// ### Arguments
    /// * `root_source` - Text of the entry file
    /// * `cwd` - Directory relative includes resolve against (must exist)
    /// * `root_path` - Optional path of the entry file; when given, a node
    ///   is created for it so cycles through the root report from it
    /// * `reader` - File access hooks
    ///
    /// ### Returns
    /// The populated graph, or the first fatal error (invalid working
    /// directory, bad include extension, unreadable file)
    pub fn build(
        root_source: &str,
        cwd: &Path,
        root_path: Option<&Path>,
        reader: &dyn SourceReader,
    ) -> Result<Self, FatalError> {
        if !reader.is_dir(cwd) {
            return Err(FatalError::new(
                ErrorCode::InvalidWorkingDirectory,
                format!("working directory '{}' does not exist", cwd.display()),
                0,
            )
            .with_path(cwd.to_path_buf()));
        }

        let mut graph = DependencyGraph::default();
        let root_id = root_path.map(|path| {
            let resolved = resolve(path, cwd);
            graph.insert_node(resolved, root_source.to_string())
        });
        if let Some(id) = root_id {
            graph.roots.push(id);
        }

        graph.scan(root_source, root_id, cwd, reader)?;
        Ok(graph)
    }

    fn insert_node(&mut self, path: PathBuf, source: String) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(DependencyNode {
            path: path.clone(),
            source,
            out_edges: Vec::new(),
        });
        self.index.insert(path, id);
        id
    }

    /// Scans one file's source for includes, recursing into files seen for
    /// the first time. A path that already has a node is a shared
    /// dependency: the edge is added but the subtree is not re-entered.
    fn scan(
        &mut self,
        source: &str,
        parent: Option<NodeId>,
        cwd: &Path,
        reader: &dyn SourceReader,
    ) -> Result<(), FatalError> {
        for (i, text) in source.lines().enumerate() {
            let line = i + 1;
            let Some(captures) = INCLUDE.captures(text) else {
                continue;
            };
            let raw = &captures[1];

            if Path::new(raw).extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
                return Err(FatalError::new(
                    ErrorCode::InvalidIncludeExtension,
                    format!("include '{}' must have the .kasm extension (line {})", raw, line),
                    line,
                )
                .with_path(PathBuf::from(raw)));
            }
            let resolved = resolve(Path::new(raw), cwd);

            if let Some(&existing) = self.index.get(&resolved) {
                self.connect(parent, existing);
                continue;
            }

            let content = reader.read(&resolved).map_err(|e| {
                FatalError::new(
                    ErrorCode::UnreadableInclude,
                    format!("could not read include '{}' (line {}): {}", raw, line, e),
                    line,
                )
                .with_path(resolved.clone())
            })?;

            let id = self.insert_node(resolved, content);
            self.connect(parent, id);
            let source = self.nodes[id].source.clone();
            self.scan(&source, Some(id), cwd, reader)?;
        }
        Ok(())
    }

    fn connect(&mut self, parent: Option<NodeId>, child: NodeId) {
        match parent {
            Some(from) => self.nodes[from].out_edges.push(child),
            None => self.roots.push(child),
        }
    }

    pub fn node(&self, id: NodeId) -> &DependencyNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node ids of every file, keyed lexicographically by path
    fn sorted_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = (0..self.nodes.len()).collect();
        ids.sort_by(|a, b| self.nodes[*a].path.cmp(&self.nodes[*b].path));
        ids
    }

    fn sorted_roots(&self) -> Vec<NodeId> {
        let mut roots = self.roots.clone();
        roots.sort_by(|a, b| self.nodes[*a].path.cmp(&self.nodes[*b].path));
        roots.dedup();
        roots
    }

    /// True when the graph has no include cycle
    pub fn acyclic(&self) -> bool {
        self.cycle_path().is_none()
    }

    /// The first include cycle found, as node names with the last element
    /// equal to the first; None when the graph is acyclic. A self-loop on
    /// `A` reports `[A, A]`.
    pub fn cycle_path(&self) -> Option<Vec<String>> {
        let mut colors = vec![Color::White; self.nodes.len()];
        let mut stack: Vec<NodeId> = Vec::new();

        for start in self.sorted_roots().into_iter().chain(self.sorted_ids()) {
            if colors[start] == Color::White {
                if let Some(cycle) = self.cycle_from(start, &mut colors, &mut stack) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn cycle_from(
        &self,
        node: NodeId,
        colors: &mut [Color],
        stack: &mut Vec<NodeId>,
    ) -> Option<Vec<String>> {
        colors[node] = Color::Gray;
        stack.push(node);

        for &next in &self.nodes[node].out_edges {
            match colors[next] {
                Color::Gray => {
                    // Re-entry point: slice the stack at the gray node and
                    // close the cycle by repeating it
                    let entry = stack.iter().position(|&id| id == next).unwrap_or(0);
                    let mut names: Vec<String> =
                        stack[entry..].iter().map(|&id| self.nodes[id].name()).collect();
                    names.push(self.nodes[next].name());
                    return Some(names);
                }
                Color::White => {
                    if let Some(cycle) = self.cycle_from(next, colors, stack) {
                        return Some(cycle);
                    }
                }
                Color::Black => {}
            }
        }

        stack.pop();
        colors[node] = Color::Black;
        None
    }

    /// Tree rendering of the graph with `(shared)` markers on nodes that
    /// were already expanded. Repeated calls render identically.
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        let mut expanded = vec![false; self.nodes.len()];

        for root in self.sorted_roots() {
            if expanded[root] {
                let _ = writeln!(out, "{} (shared)", self.nodes[root].name());
                continue;
            }
            let _ = writeln!(out, "{}", self.nodes[root].name());
            self.render_children(root, "", &mut out, &mut expanded);
        }
        out
    }

    /// Renders the subtree below `id`; the caller has printed `id` itself
    fn render_children(&self, id: NodeId, prefix: &str, out: &mut String, expanded: &mut [bool]) {
        expanded[id] = true;

        let edges = &self.nodes[id].out_edges;
        for (i, &child) in edges.iter().enumerate() {
            let last = i == edges.len() - 1;
            let connector = if last { "└── " } else { "├── " };
            let shared = expanded[child];
            let marker = if shared { " (shared)" } else { "" };
            let _ = writeln!(out, "{}{}{}{}", prefix, connector, self.nodes[child].name(), marker);

            if !shared {
                let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
                self.render_children(child, &child_prefix, out, expanded);
            }
        }
    }

    /// Graphviz DOT rendering; back-edges (edges closing a cycle) are
    /// colored red. Nodes and edges are sorted for determinism.
    pub fn to_dot(&self) -> String {
        let back_edges = self.back_edges();
        let mut out = String::from("digraph dependencies {\n");

        for id in self.sorted_ids() {
            let _ = writeln!(out, "    \"{}\";", self.nodes[id].name());
        }
        for from in self.sorted_ids() {
            let mut targets = self.nodes[from].out_edges.clone();
            targets.sort_by(|a, b| self.nodes[*a].path.cmp(&self.nodes[*b].path));
            for to in targets {
                let attrs = if back_edges.contains(&(from, to)) {
                    " [label=\"include\", color=red]"
                } else {
                    " [label=\"include\"]"
                };
                let _ = writeln!(
                    out,
                    "    \"{}\" -> \"{}\"{};",
                    self.nodes[from].name(),
                    self.nodes[to].name(),
                    attrs
                );
            }
        }

        out.push_str("}\n");
        out
    }

    /// Edges that point back into the DFS stack (the cycle-closing edges)
    fn back_edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut colors = vec![Color::White; self.nodes.len()];
        let mut found = Vec::new();

        for start in self.sorted_roots().into_iter().chain(self.sorted_ids()) {
            if colors[start] == Color::White {
                self.collect_back_edges(start, &mut colors, &mut found);
            }
        }
        found
    }

    fn collect_back_edges(
        &self,
        node: NodeId,
        colors: &mut [Color],
        found: &mut Vec<(NodeId, NodeId)>,
    ) {
        colors[node] = Color::Gray;
        for &next in &self.nodes[node].out_edges {
            match colors[next] {
                Color::Gray => found.push((node, next)),
                Color::White => self.collect_back_edges(next, colors, found),
                Color::Black => {}
            }
        }
        colors[node] = Color::Black;
    }
}

fn resolve(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
