use crate::test_utils::write_source;
use kasm_error::ErrorCode;
use kasm_preprocessor::{DependencyGraph, FsReader};
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_linear_include_chain() {
    let dir = tempdir().unwrap();
    write_source(&dir, "c.kasm", "ret\n");
    write_source(&dir, "b.kasm", "%include \"c.kasm\"\n");
    let a = write_source(&dir, "a.kasm", "%include \"b.kasm\"\n");

    let source = std::fs::read_to_string(&a).unwrap();
    let graph = DependencyGraph::build(&source, dir.path(), Some(&a), &FsReader).unwrap();

    assert_eq!(graph.node_count(), 3);
    assert!(graph.acyclic());
    assert_eq!(graph.cycle_path(), None);

    let tree = graph.to_tree_string();
    assert!(tree.contains("a.kasm"));
    assert!(tree.contains("└── "));
    assert!(tree.contains("b.kasm"));
    assert!(tree.contains("c.kasm"));
}

#[test]
fn test_shared_dependency_coalesces_into_one_node() {
    let dir = tempdir().unwrap();
    write_source(&dir, "common.kasm", "ret\n");
    write_source(&dir, "a.kasm", "%include \"common.kasm\"\n");
    write_source(&dir, "b.kasm", "%include \"common.kasm\"\n");
    let root = write_source(
        &dir,
        "root.kasm",
        "%include \"a.kasm\"\n%include \"b.kasm\"\n",
    );

    let source = std::fs::read_to_string(&root).unwrap();
    let graph = DependencyGraph::build(&source, dir.path(), Some(&root), &FsReader).unwrap();

    // root, a, b, common: the second include of common reuses the node
    assert_eq!(graph.node_count(), 4);
    assert!(graph.to_tree_string().contains("(shared)"));
}

#[test]
fn test_tree_rendering_is_idempotent() {
    let dir = tempdir().unwrap();
    write_source(&dir, "leaf.kasm", "ret\n");
    let root = write_source(&dir, "root.kasm", "%include \"leaf.kasm\"\n");

    let source = std::fs::read_to_string(&root).unwrap();
    let graph = DependencyGraph::build(&source, dir.path(), Some(&root), &FsReader).unwrap();

    assert_eq!(graph.to_tree_string(), graph.to_tree_string());
    assert_eq!(graph.to_dot(), graph.to_dot());
}

#[test]
fn test_dot_rendering_lists_nodes_and_labeled_edges() {
    let dir = tempdir().unwrap();
    write_source(&dir, "leaf.kasm", "ret\n");
    let root = write_source(&dir, "root.kasm", "%include \"leaf.kasm\"\n");

    let source = std::fs::read_to_string(&root).unwrap();
    let graph = DependencyGraph::build(&source, dir.path(), Some(&root), &FsReader).unwrap();
    let dot = graph.to_dot();

    assert!(dot.starts_with("digraph dependencies {"));
    assert!(dot.contains("label=\"include\""));
    assert!(dot.contains("leaf.kasm"));
    assert!(dot.trim_end().ends_with('}'));
}

#[test]
fn test_invalid_working_directory_is_fatal() {
    let error = DependencyGraph::build(
        "ret\n",
        Path::new("/nonexistent/kasm-graph-cwd"),
        None,
        &FsReader,
    )
    .unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidWorkingDirectory);
}

#[test]
fn test_non_kasm_include_is_fatal() {
    let dir = tempdir().unwrap();

    let error = DependencyGraph::build(
        "%include \"raw.bin\"\n",
        dir.path(),
        None,
        &FsReader,
    )
    .unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidIncludeExtension);
}

#[test]
fn test_unreadable_include_is_fatal_with_line() {
    let dir = tempdir().unwrap();

    let error = DependencyGraph::build(
        "ret\n%include \"ghost.kasm\"\n",
        dir.path(),
        None,
        &FsReader,
    )
    .unwrap_err();

    assert_eq!(error.code, ErrorCode::UnreadableInclude);
    assert_eq!(error.line, 2);
    assert!(error.path.as_ref().unwrap().ends_with("ghost.kasm"));
}
