use crate::test_utils::{hex, parse_clean, table};
use kasm_backend::{CodegenOutput, generate};
use kasm_shared::DiagnosticContext;

fn generate_clean(source: &str) -> CodegenOutput {
    let program = parse_clean(source);
    let output = generate(&program, &table(), None);
    assert!(
        output.errors.is_empty(),
        "unexpected codegen errors: {:?}",
        output.errors
    );
    output
}

#[test]
fn test_register_to_register_move() {
    // REX.W, opcode, ModR/M with reg=rbx(3), r/m=rax(0)
    let output = generate_clean("mov rax, rbx");

    assert_eq!(output.image, vec![0x48, 0x89, 0xD8], "got {}", hex(&output.image));
}

#[test]
fn test_register_immediate_move() {
    // REX.W, opcode with reg offset 0, imm32 little-endian 42
    let output = generate_clean("mov rax, 42");

    assert_eq!(
        output.image,
        vec![0x48, 0xB8, 0x2A, 0x00, 0x00, 0x00],
        "got {}",
        hex(&output.image)
    );
}

#[test]
fn test_extended_register_in_rm_position_sets_rex_b() {
    // REX.W|B = 0x49; ModR/M mod=11 reg=rax(0) r/m=r8&7(0)
    let output = generate_clean("mov r8, rax");

    assert_eq!(output.image, vec![0x49, 0x89, 0xC0], "got {}", hex(&output.image));
}

#[test]
fn test_extended_register_in_reg_position_sets_rex_r() {
    // mov rax, r9: operand 1 is the reg field, so REX.R
    let output = generate_clean("mov rax, r9");

    assert_eq!(output.image, vec![0x4C, 0x89, 0xC8], "got {}", hex(&output.image));
}

#[test]
fn test_small_program_size_and_label() {
    let output = generate_clean("_start:\n  mov rax, 60\n  ret\n");

    assert_eq!(output.resolve(".text", "_start"), Some(0));
    // MOV.RI declared size 5 + REX 1, plus RET size 1
    assert_eq!(output.image.len(), 7);
    assert_eq!(
        output.image,
        vec![0x48, 0xB8, 0x3C, 0x00, 0x00, 0x00, 0xC3],
        "got {}",
        hex(&output.image)
    );
}

#[test]
fn test_zero_operand_instructions_have_no_rex() {
    let output = generate_clean("nop\nhlt\nret\n");

    assert_eq!(output.image, vec![0x90, 0xF4, 0xC3]);
}

#[test]
fn test_backward_jump_offset() {
    // jmp at offset 0; displacement begins at 1; 0 - (1 + 4) = -5
    let output = generate_clean("start:\njmp start\n");

    assert_eq!(
        output.image,
        vec![0xE9, 0xFB, 0xFF, 0xFF, 0xFF],
        "got {}",
        hex(&output.image)
    );
}

#[test]
fn test_forward_jump_offset() {
    // jmp occupies bytes 0..5, ret at 5, target at 6: 6 - (1 + 4) = 1
    let output = generate_clean("jmp done\nret\ndone:\nnop\n");

    assert_eq!(
        output.image,
        vec![0xE9, 0x01, 0x00, 0x00, 0x00, 0xC3, 0x90],
        "got {}",
        hex(&output.image)
    );
}

#[test]
fn test_hex_and_binary_immediates() {
    let output = generate_clean("mov rax, 0xFF\nmov rcx, 0b101\n");

    assert_eq!(
        output.image,
        vec![0x48, 0xB8, 0xFF, 0x00, 0x00, 0x00, 0x48, 0xB9, 0x05, 0x00, 0x00, 0x00],
        "got {}",
        hex(&output.image)
    );
}

#[test]
fn test_invalid_immediate_emits_zero_filled_bytes() {
    let program = parse_clean("mov rax, 99999999999999999999\n");
    let output = generate(&program, &table(), None);

    assert_eq!(output.errors.len(), 1);
    assert!(
        output.errors[0]
            .message
            .contains("invalid decimal immediate '99999999999999999999'")
    );
    // Sizing stays consistent: REX + opcode + 4 zero bytes
    assert_eq!(output.image, vec![0x48, 0xB8, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn test_unknown_mnemonic_is_reported_at_emission() {
    let program = vec![kasm_ir::Statement::Instruction(kasm_ir::InstructionStmt {
        mnemonic: "frobnicate".to_string(),
        operands: Vec::new(),
        line: 1,
        column: 0,
    })];
    let output = generate(&program, &table(), None);

    assert_eq!(output.errors.len(), 1);
    assert!(output.errors[0].message.contains("unknown instruction 'frobnicate'"));
    assert!(output.image.is_empty());
}

#[test]
fn test_trace_entries_are_recorded_per_instruction() {
    let context = DiagnosticContext::new("trace.kasm");
    let program = parse_clean("mov rax, rbx\nret\n");
    let output = generate(&program, &table(), Some(&context));

    assert!(output.errors.is_empty());
    let entries = context.entries();
    let traces: Vec<_> = entries
        .iter()
        .filter(|e| e.severity == kasm_error::Severity::Trace)
        .collect();
    // One per instruction plus the completion summary
    assert_eq!(traces.len(), 3);
    assert!(traces[0].message.contains("encode mov [RM]: 48 89 D8"));
    assert!(traces[1].message.contains("encode ret [ZO]: C3"));
    assert!(
        traces[2]
            .message
            .contains("code generation complete: 4 byte(s) emitted across 1 section(s)")
    );
}
