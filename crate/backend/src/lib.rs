//! The two-pass x86_64 encoder: sections, label resolution, and byte
//! emission (REX prefix, opcode, ModR/M, immediates, relative offsets).

pub mod codegen;
pub mod section;

pub use codegen::{CodegenOutput, LabelEntry, generate};
pub use section::{Section, SectionTable};
