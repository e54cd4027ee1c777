use std::collections::HashMap;
use std::fmt;

/// Operand type classes used to match instruction variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandType {
    Register,
    Immediate,
    Memory,
    Identifier,
    String,
    /// A target resolved relative to the next instruction (jumps)
    Relative,
    /// A far target (absolute form of a control transfer)
    Far,
}

impl fmt::Display for OperandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandType::Register => "register",
            OperandType::Immediate => "immediate",
            OperandType::Memory => "memory",
            OperandType::Identifier => "identifier",
            OperandType::String => "string",
            OperandType::Relative => "relative",
            OperandType::Far => "far",
        };
        write!(f, "{}", name)
    }
}

/// Encoding kinds the emitter knows how to synthesize operand bytes for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// dst = r/m, src = reg (ModR/M follows the opcode)
    Rm,
    /// dst = reg, src = r/m
    Mr,
    /// register in the opcode low bits, 32-bit immediate follows
    Ri,
    /// 32-bit relative target follows the opcode
    Rel,
    /// far target, emitted like a relative target
    Far,
    /// zero operands, the opcode byte is the whole instruction
    Zo,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Rm => "RM",
            Encoding::Mr => "MR",
            Encoding::Ri => "RI",
            Encoding::Rel => "R",
            Encoding::Far => "F",
            Encoding::Zo => "ZO",
        };
        write!(f, "{}", name)
    }
}

/// One concrete form a mnemonic can take: an operand-type signature, the
/// opcode byte, the declared size in bytes (opcode plus operand bytes,
/// excluding any REX prefix), and the encoding kind driving emission.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionVariant {
    pub encoding: Encoding,
    pub operand_types: Vec<OperandType>,
    pub opcode: u8,
    pub size: usize,
}

impl InstructionVariant {
    pub fn new(encoding: Encoding, operand_types: Vec<OperandType>, opcode: u8, size: usize) -> Self {
        InstructionVariant {
            encoding,
            operand_types,
            opcode,
            size,
        }
    }

    /// True when this variant's signature equals the supplied type list
    pub fn matches(&self, types: &[OperandType]) -> bool {
        self.operand_types == types
    }
}

/// Lookup table from upper-cased mnemonic to its encoding variants.
///
/// Built once from static architecture data and shared by reference between
/// the semantic analyzer and the code generator.
#[derive(Debug, Clone, Default)]
pub struct InstructionTable {
    variants: HashMap<String, Vec<InstructionVariant>>,
}

impl InstructionTable {
    pub fn new() -> Self {
        InstructionTable::default()
    }

    /// Registers the variants for a mnemonic (stored upper-cased)
    pub fn insert(&mut self, mnemonic: &str, variants: Vec<InstructionVariant>) {
        self.variants.insert(mnemonic.to_uppercase(), variants);
    }

    /// All variants of a mnemonic, case-insensitively
    pub fn find(&self, mnemonic: &str) -> Option<&[InstructionVariant]> {
        self.variants
            .get(&mnemonic.to_uppercase())
            .map(|v| v.as_slice())
    }

    /// First variant of `mnemonic` whose operand-type list equals `types`
    pub fn find_variant(
        &self,
        mnemonic: &str,
        types: &[OperandType],
    ) -> Option<&InstructionVariant> {
        self.find(mnemonic)?.iter().find(|v| v.matches(types))
    }

    /// Finds a variant for the signature, trying an exact match first and
    /// then substituting every `Identifier` position with `Relative` or
    /// `Far` in all combinations. The substitution pass covers jumps and
    /// calls, where a label operand resolves to a relative target.
    pub fn resolve_variant(
        &self,
        mnemonic: &str,
        types: &[OperandType],
    ) -> Option<&InstructionVariant> {
        if let Some(variant) = self.find_variant(mnemonic, types) {
            return Some(variant);
        }

        let positions: Vec<usize> = types
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == OperandType::Identifier)
            .map(|(i, _)| i)
            .collect();
        if positions.is_empty() {
            return None;
        }

        for mask in 0u32..(1 << positions.len()) {
            let mut candidate = types.to_vec();
            for (bit, &position) in positions.iter().enumerate() {
                candidate[position] = if mask & (1 << bit) != 0 {
                    OperandType::Far
                } else {
                    OperandType::Relative
                };
            }
            if let Some(variant) = self.find_variant(mnemonic, &candidate) {
                return Some(variant);
            }
        }
        None
    }

    /// True when the table knows the mnemonic at all
    pub fn contains(&self, mnemonic: &str) -> bool {
        self.variants.contains_key(&mnemonic.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
