use crate::error_codes::ErrorCode;
use std::fmt;
use std::path::PathBuf;

/// Severity classes recognized by the diagnostic context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Trace,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Trace => "trace",
        };
        write!(f, "{}", name)
    }
}

/// Fatal error raised by the fatal-first stages (preprocessor, dependency
/// graph). Terminates the stage immediately; carries the source line and the
/// offending path where one exists.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct FatalError {
    pub code: ErrorCode,
    pub message: String,
    /// Source line of the offending directive (0 when not line-specific)
    pub line: usize,
    /// The path involved, for include and working-directory failures
    pub path: Option<PathBuf>,
}

impl FatalError {
    /// Creates a new fatal error at the given source line
    pub fn new(code: ErrorCode, message: impl Into<String>, line: usize) -> Self {
        FatalError {
            code,
            message: message.into(),
            line,
            path: None,
        }
    }

    /// Attaches the offending path to the error
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Error that occurs during parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>, line: usize, column: usize) -> Self {
        ParseError {
            code,
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Error that occurs during semantic analysis
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticError {
    pub code: ErrorCode,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl SemanticError {
    pub fn new(code: ErrorCode, message: impl Into<String>, line: usize, column: usize) -> Self {
        SemanticError {
            code,
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SemanticError {}

/// Error that occurs during code generation
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenError {
    pub code: ErrorCode,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl CodegenError {
    pub fn new(code: ErrorCode, message: impl Into<String>, line: usize, column: usize) -> Self {
        CodegenError {
            code,
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CodegenError {}

#[derive(Debug, thiserror::Error)]
pub enum AssemblerError {
    #[error("{0}")]
    Fatal(#[from] FatalError),

    #[error("parse failed with {} error(s)", .0.len())]
    Parse(Vec<ParseError>),

    #[error("semantic analysis failed with {} error(s)", .0.len())]
    Semantic(Vec<SemanticError>),

    #[error("code generation failed with {} error(s)", .0.len())]
    Codegen(Vec<CodegenError>),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AssemblerError {
    fn from(error: std::io::Error) -> Self {
        AssemblerError::Io(error.to_string())
    }
}

pub type AsmResult<T> = Result<T, AssemblerError>;
