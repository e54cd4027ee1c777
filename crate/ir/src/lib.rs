//! Program representation shared by the pipeline stages: the token stream
//! the lexer produces and the sum-type AST the parser builds from it.
//! Tokens live here because the AST embeds raw tokens (directive arguments
//! and memory operand components).

pub mod ast;
#[cfg(feature = "print-ast")]
pub mod ast_printer;
pub mod token;

pub use ast::{
    DirectiveStmt, IdentifierOperand, ImmediateOperand, InstructionStmt, LabelStmt,
    MemoryOperand, NamespaceStmt, Operand, Program, RegisterOperand, SectionStmt, Statement,
    StringOperand, UseStmt,
};
pub use token::{Token, TokenKind};
