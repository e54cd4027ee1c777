// Re-exported modules
pub mod lexer;
pub mod parser;
pub mod semantic_analysis;
#[cfg(feature = "print-tokens")]
pub mod token_printer;

// Re-export common types
pub use lexer::tokenize;
pub use parser::{ParseOutput, Parser, parse};
pub use semantic_analysis::{AnalysisOutput, analyze};
