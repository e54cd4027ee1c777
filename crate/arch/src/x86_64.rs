//! Static x86_64 architecture data: the word sets behind the default
//! profile and the instruction-variant table behind the default encoder.

use crate::instruction_table::{Encoding, InstructionTable, InstructionVariant, OperandType};
use crate::profile::ArchitectureProfile;

const REGISTERS: &[&str] = &[
    "rax", "rcx", "rdx", "rbx", "rsp", "rbp", "rsi", "rdi", "r8", "r9", "r10", "r11", "r12",
    "r13", "r14", "r15",
];

// `use` lexes as an instruction so the parser can turn it into a Use
// statement; it has no entry in the variant table.
const INSTRUCTIONS: &[&str] = &[
    "mov", "add", "sub", "xor", "cmp", "and", "or", "jmp", "call", "ret", "nop", "hlt", "use",
];

const KEYWORDS: &[&str] = &["namespace"];

/// The default x86_64 lexer vocabulary
pub fn profile() -> ArchitectureProfile {
    ArchitectureProfile::new(
        REGISTERS.iter().copied(),
        INSTRUCTIONS.iter().copied(),
        KEYWORDS.iter().copied(),
    )
}

/// The default x86_64 instruction-variant table.
///
/// Sizes count the opcode plus operand bytes; the REX prefix is added by
/// the encoder when a 64-bit register is involved. Only single-opcode-byte
/// forms fit the variant model, so two-byte `0x0F` instructions are absent.
pub fn instruction_table() -> InstructionTable {
    use Encoding::*;
    use OperandType::*;

    let mut table = InstructionTable::new();

    table.insert(
        "mov",
        vec![
            InstructionVariant::new(Rm, vec![Register, Register], 0x89, 2),
            InstructionVariant::new(Ri, vec![Register, Immediate], 0xB8, 5),
        ],
    );
    table.insert(
        "add",
        vec![InstructionVariant::new(Rm, vec![Register, Register], 0x01, 2)],
    );
    table.insert(
        "sub",
        vec![InstructionVariant::new(Rm, vec![Register, Register], 0x29, 2)],
    );
    table.insert(
        "xor",
        vec![InstructionVariant::new(Rm, vec![Register, Register], 0x31, 2)],
    );
    table.insert(
        "cmp",
        vec![InstructionVariant::new(Rm, vec![Register, Register], 0x39, 2)],
    );
    table.insert(
        "and",
        vec![InstructionVariant::new(Rm, vec![Register, Register], 0x21, 2)],
    );
    table.insert(
        "or",
        vec![InstructionVariant::new(Rm, vec![Register, Register], 0x09, 2)],
    );
    table.insert(
        "jmp",
        vec![InstructionVariant::new(Rel, vec![Relative], 0xE9, 5)],
    );
    table.insert(
        "call",
        vec![InstructionVariant::new(Rel, vec![Relative], 0xE8, 5)],
    );
    table.insert("ret", vec![InstructionVariant::new(Zo, vec![], 0xC3, 1)]);
    table.insert("nop", vec![InstructionVariant::new(Zo, vec![], 0x90, 1)]);
    table.insert("hlt", vec![InstructionVariant::new(Zo, vec![], 0xF4, 1)]);

    table
}
