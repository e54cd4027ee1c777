//! kasm: an assembler for the `.kasm` NASM-flavored x86_64 dialect.
//!
//! The crate wires the pipeline stages together: preprocessor, dependency
//! graph, lexer, parser, semantic analyzer, and code generator, all
//! reporting into a shared diagnostic context.

pub mod assembly_pipeline;

pub use assembly_pipeline::{AssemblyPipeline, AssemblyResult, PipelineStage, assemble};
