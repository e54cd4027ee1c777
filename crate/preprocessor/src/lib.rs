//! Textual preprocessing for `.kasm` sources and the include dependency
//! graph built from them.
//!
//! The preprocessor expands `%include` files, textual macros, and
//! `%ifdef`/`%ifndef` conditionals, strips `%define` lines, and produces
//! plain source for the lexer together with a line-origin map. The
//! dependency graph models the include relation rooted at the entry file,
//! detects cycles, and renders tree and DOT visualizations.

pub mod dependency_graph;
pub mod macros;
pub mod preprocessor;
pub mod source_reader;

pub use dependency_graph::{DependencyGraph, DependencyNode};
pub use preprocessor::{Inclusion, PreprocessOutput, Preprocessor};
pub use source_reader::{FsReader, SourceReader};
