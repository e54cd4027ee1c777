use crate::test_utils::{lex, profile};
use kasm_arch::ArchitectureProfile;
use kasm_frontend::lexer::tokenize;
use kasm_ir::TokenKind;
use rstest::rstest;

#[rstest]
#[case("mov", TokenKind::Instruction)]
#[case("MOV", TokenKind::Instruction)]
#[case("rax", TokenKind::Register)]
#[case("R15", TokenKind::Register)]
#[case("namespace", TokenKind::Keyword)]
#[case("section", TokenKind::Section)]
#[case("SECTION", TokenKind::Section)]
#[case("my_label", TokenKind::Identifier)]
fn test_word_classification(#[case] word: &str, #[case] expected: TokenKind) {
    let tokens = lex(word);

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, expected, "word {:?}", word);
}

#[test]
fn test_case_of_the_literal_is_preserved() {
    let tokens = lex("MOV RAX, rbx");

    assert_eq!(tokens[0].literal, "MOV");
    assert_eq!(tokens[1].literal, "RAX");
    assert_eq!(tokens[3].literal, "rbx");
}

#[test]
fn test_keyword_argument_is_never_reclassified() {
    // `mov` after `namespace` must stay an identifier even though the
    // vocabulary knows it as an instruction
    let tokens = lex("namespace mov");

    assert_eq!(tokens[0].kind, TokenKind::Keyword);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
}

#[test]
fn test_section_argument_is_never_reclassified() {
    let tokens = lex("section rax");

    assert_eq!(tokens[0].kind, TokenKind::Section);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
}

#[test]
fn test_empty_profile_classifies_every_word_as_identifier() {
    let empty = ArchitectureProfile::empty();
    let tokens = tokenize("mov rax, rbx", &empty, None);

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[3].kind, TokenKind::Identifier);
}

#[test]
fn test_section_word_is_special_even_with_empty_profile() {
    let empty = ArchitectureProfile::empty();
    let tokens = tokenize("section .data", &empty, None);

    assert_eq!(tokens[0].kind, TokenKind::Section);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
}

#[test]
fn test_profile_lookups_are_case_insensitive() {
    let p = profile();

    assert!(p.is_register("RAX"));
    assert!(p.is_register("rax"));
    assert!(p.is_instruction("Mov"));
    assert!(p.is_keyword("NAMESPACE"));
    assert!(!p.is_instruction("frobnicate"));
}
