//! Pass 2 statement validation: instruction variants, operand shapes,
//! immediate literals, and symbol resolution.

use super::SemanticAnalyzer;
use kasm_arch::OperandType;
use kasm_error::ErrorCode;
use kasm_ir::{
    DirectiveStmt, InstructionStmt, MemoryOperand, NamespaceStmt, Operand, TokenKind, UseStmt,
};

/// Operators legal between memory operand components
const MEMORY_OPERATORS: &[&str] = &["+", "-"];
/// Operators reported explicitly when they appear in a memory operand
const REJECTED_OPERATORS: &[&str] = &["*", "/", "%", "&", "|", "^"];

/// Maps an AST operand onto its type class for variant matching
pub(crate) fn operand_type(operand: &Operand) -> OperandType {
    match operand {
        Operand::Register(_) => OperandType::Register,
        Operand::Immediate(_) => OperandType::Immediate,
        Operand::Memory(_) => OperandType::Memory,
        Operand::Identifier(_) => OperandType::Identifier,
        Operand::String(_) => OperandType::String,
    }
}

/// Operand-type signature of an operand list, as used for variant lookup
/// by both the analyzer and the code generator
pub fn operand_signature(operands: &[Operand]) -> Vec<OperandType> {
    operands.iter().map(operand_type).collect()
}

/// True for a well-formed immediate literal: hex with a non-empty body, or
/// all decimal digits.
pub(crate) fn is_valid_immediate(text: &str) -> bool {
    if let Some(body) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return !body.is_empty() && body.chars().all(|c| c.is_ascii_hexdigit());
    }
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

impl<'a> SemanticAnalyzer<'a> {
    pub(crate) fn validate_instruction(&mut self, instruction: &InstructionStmt) {
        let mnemonic = &instruction.mnemonic;

        match self.table.find(mnemonic) {
            None => {
                self.record(
                    ErrorCode::UnknownInstruction,
                    format!("unknown instruction '{}'", mnemonic),
                    instruction.line,
                    instruction.column,
                );
            }
            Some(variants) if !variants.is_empty() => {
                let signature: Vec<OperandType> =
                    instruction.operands.iter().map(operand_type).collect();

                if self.table.resolve_variant(mnemonic, &signature).is_none() {
                    let arity_matches = variants
                        .iter()
                        .any(|v| v.operand_types.len() == signature.len());
                    if arity_matches {
                        let types: Vec<String> =
                            signature.iter().map(|t| t.to_string()).collect();
                        self.record(
                            ErrorCode::NoMatchingVariant,
                            format!(
                                "no variant of '{}' accepts operands ({})",
                                mnemonic,
                                types.join(", ")
                            ),
                            instruction.line,
                            instruction.column,
                        );
                    } else {
                        let mut arities: Vec<usize> =
                            variants.iter().map(|v| v.operand_types.len()).collect();
                        arities.sort_unstable();
                        arities.dedup();
                        let counts: Vec<String> =
                            arities.iter().map(|n| n.to_string()).collect();
                        self.record(
                            ErrorCode::OperandCountMismatch,
                            format!(
                                "instruction '{}' expects {} operand(s), got {}",
                                mnemonic,
                                counts.join(" or "),
                                signature.len()
                            ),
                            instruction.line,
                            instruction.column,
                        );
                    }
                }
            }
            Some(_) => {}
        }

        // Operands are validated in isolation even when the mnemonic or
        // variant lookup failed.
        for operand in &instruction.operands {
            self.validate_operand(operand);
        }
    }

    fn validate_operand(&mut self, operand: &Operand) {
        match operand {
            Operand::Immediate(immediate) => {
                if !is_valid_immediate(&immediate.value) {
                    self.record(
                        ErrorCode::InvalidImmediate,
                        format!("invalid immediate value '{}'", immediate.value),
                        immediate.line,
                        immediate.column,
                    );
                }
            }
            Operand::Memory(memory) => self.validate_memory(memory),
            Operand::Identifier(identifier) => {
                if !self.is_defined_label(&identifier.name) {
                    self.record(
                        ErrorCode::UndefinedReference,
                        format!("undefined reference to '{}'", identifier.name),
                        identifier.line,
                        identifier.column,
                    );
                }
            }
            Operand::Register(_) | Operand::String(_) => {}
        }
    }

    fn validate_memory(&mut self, memory: &MemoryOperand) {
        if memory.components.is_empty() {
            self.record(
                ErrorCode::EmptyMemoryOperand,
                "empty memory operand".to_string(),
                memory.line,
                memory.column,
            );
            return;
        }

        let first = &memory.components[0];
        if first.kind == TokenKind::Immediate {
            self.record(
                ErrorCode::InvalidMemoryBase,
                "memory operand base must be a register or identifier".to_string(),
                first.line,
                first.column,
            );
        }

        for component in &memory.components {
            let literal = component.literal.as_str();
            if MEMORY_OPERATORS.contains(&literal) {
                continue;
            }
            if REJECTED_OPERATORS.contains(&literal) {
                self.record(
                    ErrorCode::InvalidMemoryOperator,
                    format!("invalid operator '{}' in memory operand", literal),
                    component.line,
                    component.column,
                );
            }
        }
    }

    pub(crate) fn validate_namespace(&mut self, namespace: &NamespaceStmt) {
        if namespace.name.is_empty() {
            self.record(
                ErrorCode::InvalidNamespaceName,
                "namespace name cannot be empty".to_string(),
                namespace.line,
                namespace.column,
            );
        } else if namespace.name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            self.record(
                ErrorCode::InvalidNamespaceName,
                format!("namespace name '{}' cannot start with a digit", namespace.name),
                namespace.line,
                namespace.column,
            );
        }
    }

    pub(crate) fn validate_use(&mut self, import: &UseStmt) {
        if import.module_name.is_empty() {
            self.record(
                ErrorCode::EmptyModuleName,
                "module name in 'use' cannot be empty".to_string(),
                import.line,
                import.column,
            );
        }
    }

    /// No directives are legal after preprocessing; anything that survived
    /// into the AST is rejected here.
    pub(crate) fn validate_directive(&mut self, directive: &DirectiveStmt) {
        self.record(
            ErrorCode::UnrecognisedDirective,
            format!("unrecognised directive '{}'", directive.literal),
            directive.line,
            directive.column,
        );
    }
}
