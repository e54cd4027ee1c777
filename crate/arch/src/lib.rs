//! Architecture vocabulary for the assembler.
//!
//! An [`ArchitectureProfile`] carries the register, instruction, and keyword
//! sets the lexer classifies words against; the [`InstructionTable`] carries
//! the per-mnemonic encoding variants the semantic analyzer and code
//! generator consume. Both are immutable after construction and safe to
//! share by reference across stages.

pub mod instruction_table;
pub mod profile;
pub mod registers;
pub mod x86_64;

pub use instruction_table::{Encoding, InstructionTable, InstructionVariant, OperandType};
pub use profile::ArchitectureProfile;
pub use registers::{is_extended, register_number};
