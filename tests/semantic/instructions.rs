use crate::test_utils::{parse_clean, table};
use kasm_error::SemanticError;
use kasm_frontend::semantic_analysis::analyze;
use kasm_ir::{InstructionStmt, Statement};

fn analyze_source(source: &str) -> Vec<SemanticError> {
    let program = parse_clean(source);
    analyze(&program, &table(), None, None).errors
}

#[test]
fn test_clean_program_has_no_errors() {
    let errors = analyze_source("_start:\n  mov rax, 60\n  ret\n");

    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[test]
fn test_unknown_instruction_is_reported() {
    let program = vec![Statement::Instruction(InstructionStmt {
        mnemonic: "frobnicate".to_string(),
        operands: Vec::new(),
        line: 1,
        column: 0,
    })];
    let output = analyze(&program, &table(), None, None);

    assert_eq!(output.errors.len(), 1);
    assert!(
        output.errors[0]
            .message
            .contains("unknown instruction 'frobnicate'")
    );
}

#[test]
fn test_mnemonic_lookup_is_case_insensitive() {
    let errors = analyze_source("MOV rax, rbx\nRET\n");

    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[test]
fn test_operand_count_mismatch_lists_expected_arities() {
    let errors = analyze_source("mov rax\n");

    assert_eq!(errors.len(), 1);
    assert!(
        errors[0]
            .message
            .contains("instruction 'mov' expects 2 operand(s), got 1")
    );
}

#[test]
fn test_zero_operand_instruction_rejects_operands() {
    let errors = analyze_source("ret rax\n");

    assert_eq!(errors.len(), 1);
    assert!(
        errors[0]
            .message
            .contains("instruction 'ret' expects 0 operand(s), got 1")
    );
}

#[test]
fn test_no_variant_message_lists_operand_types() {
    let errors = analyze_source("mov 5, rax\n");

    assert_eq!(errors.len(), 1);
    assert!(
        errors[0]
            .message
            .contains("no variant of 'mov' accepts operands (immediate, register)")
    );
}

#[test]
fn test_label_operand_matches_relative_variant() {
    // `jmp target` has signature (identifier); the relative variant is
    // found through substitution
    let errors = analyze_source("jmp target\ntarget:\n");

    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[test]
fn test_forward_references_are_legal() {
    let errors = analyze_source("jmp done\nmov rax, rbx\ndone:\n  ret\n");

    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[test]
fn test_undefined_reference_is_reported() {
    let errors = analyze_source("jmp nowhere\n");

    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("undefined reference to 'nowhere'"));
}

#[test]
fn test_invalid_immediate_with_empty_hex_body() {
    let errors = analyze_source("mov rax, 0x\n");

    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("invalid immediate value '0x'"));
}

#[test]
fn test_memory_base_must_not_be_immediate() {
    let errors = analyze_source("mov rax, [8 + rbx]\n");

    assert!(
        errors
            .iter()
            .any(|e| e.message.contains("memory operand base must be a register or identifier"))
    );
}

#[test]
fn test_rejected_memory_operator_is_named() {
    let errors = analyze_source("mov rax, [rbx * 2]\n");

    assert!(
        errors
            .iter()
            .any(|e| e.message.contains("invalid operator '*' in memory operand"))
    );
}

#[test]
fn test_empty_memory_operand() {
    let errors = analyze_source("mov rax, []\n");

    assert!(errors.iter().any(|e| e.message.contains("empty memory operand")));
}

#[test]
fn test_operands_validated_even_for_unknown_mnemonic() {
    let program = vec![Statement::Instruction(InstructionStmt {
        mnemonic: "frobnicate".to_string(),
        operands: parse_operands("mov rax, 0x"),
        line: 1,
        column: 0,
    })];
    let output = analyze(&program, &table(), None, None);

    assert_eq!(output.errors.len(), 2);
}

#[test]
fn test_surviving_directive_is_rejected() {
    let errors = analyze_source("%align 16\n");

    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("unrecognised directive '%align'"));
}

/// Operands of the first instruction in the source
fn parse_operands(source: &str) -> Vec<kasm_ir::Operand> {
    let program = parse_clean(source);
    let Statement::Instruction(instruction) = &program[0] else {
        panic!("expected an instruction statement");
    };
    instruction.operands.clone()
}
