use crate::exit;

/// Error surfaced by a CLI command, carrying the exit code to terminate
/// the process with
#[derive(Debug)]
pub enum CliError {
    Generic {
        message: String,
        exit_code: exit::Code,
    },
}

impl CliError {
    pub fn message(&self) -> &str {
        match self {
            CliError::Generic { message, .. } => message,
        }
    }

    pub fn exit_code(&self) -> exit::Code {
        match self {
            CliError::Generic { exit_code, .. } => *exit_code,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CliError {}

pub type CliResult<T> = Result<T, CliError>;
