//! Error handling utilities for the kasm assembler
//!
//! This crate provides the centralized error types used across the assembler
//! infrastructure: structured error codes, the per-stage value errors that
//! the accumulating stages collect, and the fatal error type raised by the
//! fatal-first stages (preprocessor and dependency graph).

pub mod error_codes;
pub mod error_types;

pub use error_codes::ErrorCode;
pub use error_types::{
    AsmResult, AssemblerError, CodegenError, FatalError, ParseError, SemanticError, Severity,
};
