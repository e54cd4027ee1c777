use crate::test_utils::{lex, profile};
use kasm_frontend::lexer::tokenize;
use kasm_ir::TokenKind;
use kasm_shared::DiagnosticContext;

#[test]
fn test_basic_instruction_line() {
    let tokens = lex("mov rax, rbx");

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Instruction,
            TokenKind::Register,
            TokenKind::Identifier,
            TokenKind::Register,
        ]
    );
    let literals: Vec<&str> = tokens.iter().map(|t| t.literal.as_str()).collect();
    assert_eq!(literals, vec!["mov", "rax", ",", "rbx"]);
}

#[test]
fn test_positions_are_line_and_column_of_first_character() {
    let tokens = lex("mov rax, rbx\n  ret");

    assert_eq!((tokens[0].line, tokens[0].column), (1, 0));
    assert_eq!((tokens[1].line, tokens[1].column), (1, 4));
    assert_eq!((tokens[2].line, tokens[2].column), (1, 7));
    assert_eq!((tokens[3].line, tokens[3].column), (1, 9));
    assert_eq!((tokens[4].line, tokens[4].column), (2, 2));
}

#[test]
fn test_whitespace_and_comments_are_not_emitted() {
    let tokens = lex("ret ; trailing comment\n; full line comment\n");

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].literal, "ret");
}

#[test]
fn test_label_absorbs_trailing_colon() {
    let tokens = lex("_start:");

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].literal, "_start:");
    assert!(tokens[0].is_label());
}

#[test]
fn test_directive_literal_keeps_percent() {
    let tokens = lex("%include \"lib.kasm\"");

    assert_eq!(tokens[0].kind, TokenKind::Directive);
    assert_eq!(tokens[0].literal, "%include");
    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].literal, "lib.kasm");
}

#[test]
fn test_immediate_forms_are_preserved_verbatim() {
    let tokens = lex("42 0xFF 0b101");

    let literals: Vec<&str> = tokens.iter().map(|t| t.literal.as_str()).collect();
    assert_eq!(literals, vec!["42", "0xFF", "0b101"]);
    assert!(tokens.iter().all(|t| t.kind == TokenKind::Immediate));
}

#[test]
fn test_string_delimiters_are_stripped() {
    let tokens = lex("\"hello world\"");

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].literal, "hello world");
}

#[test]
fn test_unterminated_string_degrades_to_warning() {
    let context = DiagnosticContext::new("test.kasm");
    let tokens = tokenize("\"abc", &profile(), Some(&context));

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].literal, "abc");
    assert_eq!(context.warning_count(), 1);
    assert!(!context.has_errors());
    assert!(
        context.warnings()[0]
            .message
            .contains("unterminated string literal")
    );
}

#[test]
fn test_punctuation_becomes_single_character_identifiers() {
    let tokens = lex("[rbx + 8]");

    let literals: Vec<&str> = tokens.iter().map(|t| t.literal.as_str()).collect();
    assert_eq!(literals, vec!["[", "rbx", "+", "8", "]"]);
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
}

#[test]
fn test_tokenizing_twice_yields_identical_streams() {
    let source = "section .text\n_start:\n  mov rax, 0x2A\n  jmp _start ; loop\n";

    let first = lex(source);
    let second = lex(source);

    assert_eq!(first, second);
}
