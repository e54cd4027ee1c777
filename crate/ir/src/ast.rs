use crate::token::Token;
use std::fmt::Display;

/// An assembled program: statements in source order
pub type Program = Vec<Statement>;

/// Statement nodes in the AST
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// An instruction with its operand list
    Instruction(InstructionStmt),
    /// A label declaration (trailing colon stripped)
    Label(LabelStmt),
    /// A namespace declaration
    Namespace(NamespaceStmt),
    /// A module import
    Use(UseStmt),
    /// A directive that survived preprocessing, with its raw argument tokens
    Directive(DirectiveStmt),
    /// A section switch
    Section(SectionStmt),
}

impl Statement {
    /// Source position of the statement as (line, column)
    pub fn location(&self) -> (usize, usize) {
        match self {
            Statement::Instruction(s) => (s.line, s.column),
            Statement::Label(s) => (s.line, s.column),
            Statement::Namespace(s) => (s.line, s.column),
            Statement::Use(s) => (s.line, s.column),
            Statement::Directive(s) => (s.line, s.column),
            Statement::Section(s) => (s.line, s.column),
        }
    }
}

/// An instruction statement
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionStmt {
    /// Mnemonic as written (case preserved; compared case-insensitively)
    pub mnemonic: String,
    /// Operands in source order
    pub operands: Vec<Operand>,
    pub line: usize,
    pub column: usize,
}

/// A label declaration
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStmt {
    /// Label name with the trailing colon stripped, case preserved
    pub name: String,
    pub line: usize,
    pub column: usize,
}

/// A namespace declaration
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceStmt {
    pub name: String,
    pub line: usize,
    pub column: usize,
}

/// A module import
#[derive(Debug, Clone, PartialEq)]
pub struct UseStmt {
    pub module_name: String,
    pub line: usize,
    pub column: usize,
}

/// A directive with its raw argument tokens
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveStmt {
    /// Directive literal including the leading '%'
    pub literal: String,
    pub args: Vec<Token>,
    pub line: usize,
    pub column: usize,
}

/// A section switch statement
#[derive(Debug, Clone, PartialEq)]
pub struct SectionStmt {
    /// Section name as written, trailing colon stripped (e.g. `.text`)
    pub name: String,
    /// Lower-cased section key the backend switches on
    pub section_type: String,
    pub line: usize,
    pub column: usize,
}

/// Operand nodes in the AST
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A register reference, original case preserved
    Register(RegisterOperand),
    /// An immediate literal kept in its textual form until code generation
    Immediate(ImmediateOperand),
    /// A string literal, already unquoted
    String(StringOperand),
    /// A bare identifier (usually a label reference)
    Identifier(IdentifierOperand),
    /// A memory operand holding its raw component tokens
    Memory(MemoryOperand),
}

impl Operand {
    /// Source position of the operand as (line, column)
    pub fn location(&self) -> (usize, usize) {
        match self {
            Operand::Register(o) => (o.line, o.column),
            Operand::Immediate(o) => (o.line, o.column),
            Operand::String(o) => (o.line, o.column),
            Operand::Identifier(o) => (o.line, o.column),
            Operand::Memory(o) => (o.line, o.column),
        }
    }

    /// Lower-case noun used in diagnostics ("register", "immediate", ...)
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operand::Register(_) => "register",
            Operand::Immediate(_) => "immediate",
            Operand::String(_) => "string",
            Operand::Identifier(_) => "identifier",
            Operand::Memory(_) => "memory",
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Register(o) => write!(f, "{}", o.name),
            Operand::Immediate(o) => write!(f, "{}", o.value),
            Operand::String(o) => write!(f, "\"{}\"", o.value),
            Operand::Identifier(o) => write!(f, "{}", o.name),
            Operand::Memory(o) => {
                let inner: Vec<&str> = o.components.iter().map(|t| t.literal.as_str()).collect();
                write!(f, "[{}]", inner.join(" "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterOperand {
    pub name: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImmediateOperand {
    /// The literal exactly as written; numeric parsing happens in codegen
    pub value: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringOperand {
    pub value: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierOperand {
    pub name: String,
    pub line: usize,
    pub column: usize,
}

/// A memory operand: the raw token sequence between '[' and ']',
/// operators included
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryOperand {
    pub components: Vec<Token>,
    pub line: usize,
    pub column: usize,
}
