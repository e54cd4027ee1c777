//! Debug printer for the token stream, compiled in with the
//! `print-tokens` feature.

use kasm_ir::Token;

/// Prints one token per line with its position and kind
pub fn print_tokens(tokens: &[Token]) {
    println!("=== Tokens ===");
    for token in tokens {
        println!(
            "{:>4}:{:<3} {:<12} {}",
            token.line, token.column, token.kind.to_string(), token.literal
        );
    }
}
