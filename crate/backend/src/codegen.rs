use crate::section::SectionTable;
use kasm_arch::{
    Encoding, InstructionTable, InstructionVariant, is_extended, register_number,
};
use kasm_error::{CodegenError, ErrorCode, Severity};
use kasm_frontend::semantic_analysis::operand_signature;
use kasm_ir::{InstructionStmt, Operand, Program, Statement};
use kasm_shared::DiagnosticContext;
use std::collections::HashMap;

/// The section every label and instruction lands in when no `section`
/// statement has been seen yet
const DEFAULT_SECTION: &str = ".text";

/// A label recorded during the sizing pass.
/// Uniqueness key is the (section, name) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEntry {
    pub name: String,
    pub section: String,
    /// Byte offset of the label within its section
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

/// Result of code generation. Always produced, even when errors
/// accumulated; callers decide whether to use the image.
#[derive(Debug)]
pub struct CodegenOutput {
    /// The flat byte image in section order
    pub image: Vec<u8>,
    /// The per-section buffers behind the image
    pub sections: SectionTable,
    /// Errors accumulated across both passes
    pub errors: Vec<CodegenError>,
    labels: HashMap<(String, String), LabelEntry>,
}

impl CodegenOutput {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Byte offset a label resolved to during the sizing pass
    pub fn resolve(&self, section: &str, name: &str) -> Option<usize> {
        self.labels
            .get(&(section.to_string(), name.to_string()))
            .map(|entry| entry.offset)
    }
}

/// Two-pass encoder: the first pass sizes instructions and records label
/// offsets, the second emits bytes with labels resolved
struct CodeGenerator<'a> {
    table: &'a InstructionTable,
    sections: SectionTable,
    labels: HashMap<(String, String), LabelEntry>,
    errors: Vec<CodegenError>,
    diagnostics: Option<&'a DiagnosticContext>,
    current_section: Option<String>,
}

/// Encodes a validated program into its byte image.
///
/// ### Arguments
/// * `program` - The statements to encode
/// * `table` - The instruction-variant table
/// * `diagnostics` - Optional sink for per-instruction trace entries
///
/// ### Returns
/// The image, section buffers, label table, and accumulated errors
pub fn generate(
    program: &Program,
    table: &InstructionTable,
    diagnostics: Option<&DiagnosticContext>,
) -> CodegenOutput {
    let mut generator = CodeGenerator {
        table,
        sections: SectionTable::new(),
        labels: HashMap::new(),
        errors: Vec::new(),
        diagnostics,
        current_section: None,
    };

    generator.collect(program);
    generator.sections.reset_sizes();
    generator.current_section = None;
    generator.emit(program);

    let image = generator.sections.image();
    if let Some(context) = generator.diagnostics {
        context.record(
            Severity::Trace,
            context.loc(0, 0),
            format!(
                "code generation complete: {} byte(s) emitted across {} section(s)",
                image.len(),
                generator.sections.len()
            ),
        );
    }

    CodegenOutput {
        image,
        sections: generator.sections,
        errors: generator.errors,
        labels: generator.labels,
    }
}

impl<'a> CodeGenerator<'a> {
    /// Pass 1: walk statements, track section sizes, and record labels
    fn collect(&mut self, program: &Program) {
        for statement in program {
            match statement {
                Statement::Section(section) => {
                    self.switch_section(&section.section_type);
                }
                Statement::Label(label) => {
                    let section = self.require_section();
                    let key = (section.clone(), label.name.clone());
                    if let Some(previous) = self.labels.get(&key) {
                        self.errors.push(CodegenError::new(
                            ErrorCode::DuplicateLabel,
                            format!(
                                "duplicate label '{}' in section '{}', previously declared at {}:{}",
                                label.name, section, previous.line, previous.column
                            ),
                            label.line,
                            label.column,
                        ));
                        continue;
                    }
                    let offset = self.sections.get_or_create(&section).size;
                    self.labels.insert(
                        key,
                        LabelEntry {
                            name: label.name.clone(),
                            section,
                            offset,
                            line: label.line,
                            column: label.column,
                        },
                    );
                }
                Statement::Instruction(instruction) => {
                    let size = self.instruction_size(instruction);
                    let section = self.require_section();
                    self.sections.get_or_create(&section).advance(size);
                }
                Statement::Namespace(_) | Statement::Use(_) | Statement::Directive(_) => {}
            }
        }
    }

    /// Pass 2: walk statements again, emitting bytes
    fn emit(&mut self, program: &Program) {
        for statement in program {
            match statement {
                Statement::Section(section) => {
                    self.switch_section(&section.section_type);
                }
                Statement::Instruction(instruction) => {
                    self.emit_instruction(instruction);
                }
                _ => {}
            }
        }
    }

    fn switch_section(&mut self, name: &str) {
        self.sections.get_or_create(name);
        self.current_section = Some(name.to_string());
    }

    /// The active section, implicitly creating `.text` when none is
    fn require_section(&mut self) -> String {
        if self.current_section.is_none() {
            self.switch_section(DEFAULT_SECTION);
        }
        self.current_section.clone().unwrap_or_else(|| DEFAULT_SECTION.to_string())
    }

    /// Declared variant size plus one REX byte when a 64-bit register is
    /// involved. Unresolvable instructions contribute zero; their errors
    /// surface during emission.
    fn instruction_size(&self, instruction: &InstructionStmt) -> usize {
        let signature = operand_signature(&instruction.operands);
        match self.table.resolve_variant(&instruction.mnemonic, &signature) {
            Some(variant) => variant.size + usize::from(rex_byte(&instruction.operands).is_some()),
            None => 0,
        }
    }

    fn emit_instruction(&mut self, instruction: &InstructionStmt) {
        if self.table.find(&instruction.mnemonic).is_none() {
            self.errors.push(CodegenError::new(
                ErrorCode::UnknownMnemonic,
                format!("unknown instruction '{}'", instruction.mnemonic),
                instruction.line,
                instruction.column,
            ));
            return;
        }

        let signature = operand_signature(&instruction.operands);
        let Some(variant) = self
            .table
            .resolve_variant(&instruction.mnemonic, &signature)
            .cloned()
        else {
            let types: Vec<String> = signature.iter().map(|t| t.to_string()).collect();
            self.errors.push(CodegenError::new(
                ErrorCode::NoEncodableVariant,
                format!(
                    "no variant of '{}' accepts operands ({})",
                    instruction.mnemonic,
                    types.join(", ")
                ),
                instruction.line,
                instruction.column,
            ));
            return;
        };

        let section = self.require_section();
        let base = self.sections.get_or_create(&section).size;
        let bytes = self.encode(instruction, &variant, &section, base);

        let target = self.sections.get_or_create(&section);
        for byte in &bytes {
            target.push_byte(*byte);
        }

        if let Some(context) = self.diagnostics {
            let rendered: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
            context.record(
                Severity::Trace,
                context.loc(instruction.line, instruction.column + 1),
                format!(
                    "encode {} [{}]: {}",
                    instruction.mnemonic,
                    variant.encoding,
                    rendered.join(" ")
                ),
            );
        }
    }

    /// Synthesizes the byte sequence for one instruction: optional REX
    /// prefix, opcode, then operand bytes per encoding kind.
    fn encode(
        &mut self,
        instruction: &InstructionStmt,
        variant: &InstructionVariant,
        section: &str,
        base: usize,
    ) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(variant.size + 1);
        if let Some(rex) = rex_byte(&instruction.operands) {
            bytes.push(rex);
        }

        match variant.encoding {
            Encoding::Zo => {
                bytes.push(variant.opcode);
            }
            Encoding::Rm => {
                bytes.push(variant.opcode);
                let dst = self.register_field(&instruction.operands, 0);
                let src = self.register_field(&instruction.operands, 1);
                bytes.push(0xC0 | ((src & 7) << 3) | (dst & 7));
            }
            Encoding::Mr => {
                bytes.push(variant.opcode);
                let dst = self.register_field(&instruction.operands, 0);
                let src = self.register_field(&instruction.operands, 1);
                bytes.push(0xC0 | ((dst & 7) << 3) | (src & 7));
            }
            Encoding::Ri => {
                let reg = self.register_field(&instruction.operands, 0);
                bytes.push(variant.opcode | (reg & 7));
                let value = self.immediate_operand(&instruction.operands, 1);
                bytes.extend_from_slice(&(value as u32).to_le_bytes());
            }
            Encoding::Rel | Encoding::Far => {
                bytes.push(variant.opcode);
                // Position of the displacement within the section
                let position = base + bytes.len();
                let offset = match self.resolve_target(instruction, section) {
                    Some(target) => target - (position as i64 + 4),
                    // Zero-filled so later instructions stay in sync
                    None => 0,
                };
                bytes.extend_from_slice(&(offset as i32).to_le_bytes());
            }
        }

        bytes
    }

    /// Register number for the operand at `index`, reporting a generic
    /// error and falling back to zero when the operand cannot supply one.
    fn register_field(&mut self, operands: &[Operand], index: usize) -> u8 {
        let Some(Operand::Register(register)) = operands.get(index) else {
            return 0;
        };
        match register_number(&register.name) {
            Some(number) => number,
            None => {
                self.errors.push(CodegenError::new(
                    ErrorCode::GenericAssemblyError,
                    format!("unknown register '{}'", register.name),
                    register.line,
                    register.column,
                ));
                0
            }
        }
    }

    /// Parses the immediate operand at `index`, reporting malformed
    /// literals and falling back to zero.
    fn immediate_operand(&mut self, operands: &[Operand], index: usize) -> i64 {
        let Some(Operand::Immediate(immediate)) = operands.get(index) else {
            return 0;
        };
        match parse_immediate(&immediate.value) {
            Ok(value) => value,
            Err(message) => {
                self.errors.push(CodegenError::new(
                    ErrorCode::InvalidImmediateLiteral,
                    message,
                    immediate.line,
                    immediate.column,
                ));
                0
            }
        }
    }

    /// Resolves the target of a relative or far transfer. Identifier
    /// targets must name a label in the current section.
    fn resolve_target(&mut self, instruction: &InstructionStmt, section: &str) -> Option<i64> {
        let operand = instruction.operands.first()?;

        match operand {
            Operand::Identifier(identifier) => {
                let key = (section.to_string(), identifier.name.clone());
                if let Some(entry) = self.labels.get(&key) {
                    return Some(entry.offset as i64);
                }
                if let Some(other) = self
                    .labels
                    .values()
                    .find(|entry| entry.name == identifier.name)
                {
                    self.errors.push(CodegenError::new(
                        ErrorCode::CrossSectionReference,
                        format!(
                            "cross-section reference to label '{}' (declared in '{}', used in '{}')",
                            identifier.name, other.section, section
                        ),
                        identifier.line,
                        identifier.column,
                    ));
                    return None;
                }
                self.errors.push(CodegenError::new(
                    ErrorCode::UnresolvedLabel,
                    format!("unresolved label '{}'", identifier.name),
                    identifier.line,
                    identifier.column,
                ));
                None
            }
            // A literal target is taken as an absolute section offset
            Operand::Immediate(immediate) => match parse_immediate(&immediate.value) {
                Ok(value) => Some(value),
                Err(message) => {
                    self.errors.push(CodegenError::new(
                        ErrorCode::InvalidImmediateLiteral,
                        message,
                        immediate.line,
                        immediate.column,
                    ));
                    None
                }
            },
            _ => {
                self.errors.push(CodegenError::new(
                    ErrorCode::UnresolvedLabel,
                    format!(
                        "{} operand cannot be a transfer target",
                        operand.kind_name()
                    ),
                    operand.location().0,
                    operand.location().1,
                ));
                None
            }
        }
    }
}

/// REX prefix for the operand list, or None when no 64-bit register is
/// involved. `W` is always set; operand 0 maps to `r/m` (the `B` bit) and
/// operand 1 to `reg` (the `R` bit).
fn rex_byte(operands: &[Operand]) -> Option<u8> {
    let mut needed = false;
    let mut byte = 0x48u8;

    for (index, operand) in operands.iter().enumerate() {
        let Operand::Register(register) = operand else {
            continue;
        };
        let Some(number) = register_number(&register.name) else {
            continue;
        };
        needed = true;
        if is_extended(number) {
            byte |= if index == 0 { 0x01 } else { 0x04 };
        }
    }

    needed.then_some(byte)
}

/// Parses an immediate literal at emission time: hex (`0x`), binary
/// (`0b`), or optionally signed decimal.
fn parse_immediate(literal: &str) -> Result<i64, String> {
    if let Some(body) = literal.strip_prefix("0x").or_else(|| literal.strip_prefix("0X")) {
        return i64::from_str_radix(body, 16)
            .map_err(|e| format!("invalid hex immediate '{}': {}", literal, e));
    }
    if let Some(body) = literal.strip_prefix("0b").or_else(|| literal.strip_prefix("0B")) {
        return i64::from_str_radix(body, 2)
            .map_err(|e| format!("invalid binary immediate '{}': {}", literal, e));
    }
    literal
        .parse::<i64>()
        .map_err(|e| format!("invalid decimal immediate '{}': {}", literal, e))
}
