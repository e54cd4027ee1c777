use crate::test_utils::{parse_clean, table};
use kasm_backend::generate;

#[test]
fn test_duplicate_label_in_same_section() {
    let program = parse_clean("section .text\n_start:\n  mov rax, 1\n_start:\n");
    let output = generate(&program, &table(), None);

    assert_eq!(output.errors.len(), 1);
    assert_eq!(
        output.errors[0].message,
        "duplicate label '_start' in section '.text', previously declared at 2:0"
    );
}

#[test]
fn test_same_name_in_different_sections_is_legal() {
    let program = parse_clean("section .text\nhere:\nret\nsection .data\nhere:\n");
    let output = generate(&program, &table(), None);

    assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
    assert_eq!(output.resolve(".text", "here"), Some(0));
    assert_eq!(output.resolve(".data", "here"), Some(0));
}

#[test]
fn test_label_offsets_follow_instruction_sizes() {
    let program = parse_clean("a:\nmov rax, rbx\nb:\nmov rax, 1\nc:\nret\nd:\n");
    let output = generate(&program, &table(), None);

    assert!(output.errors.is_empty());
    assert_eq!(output.resolve(".text", "a"), Some(0));
    assert_eq!(output.resolve(".text", "b"), Some(3));
    assert_eq!(output.resolve(".text", "c"), Some(9));
    assert_eq!(output.resolve(".text", "d"), Some(10));
}

#[test]
fn test_cross_section_reference_is_an_error() {
    let program = parse_clean("section .text\njmp data_label\nsection .data\ndata_label:\n");
    let output = generate(&program, &table(), None);

    assert_eq!(output.errors.len(), 1);
    assert_eq!(
        output.errors[0].message,
        "cross-section reference to label 'data_label' (declared in '.data', used in '.text')"
    );
    // The displacement is zero-filled so sizing stays consistent
    assert_eq!(output.sections.get(".text").unwrap().bytes, vec![0xE9, 0, 0, 0, 0]);
}

#[test]
fn test_unresolved_label_is_an_error_with_zero_fill() {
    let program = parse_clean("jmp nowhere\nret\n");
    let output = generate(&program, &table(), None);

    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].message, "unresolved label 'nowhere'");
    assert_eq!(output.image, vec![0xE9, 0, 0, 0, 0, 0xC3]);
}

#[test]
fn test_resolve_round_trip_matches_pass_one_offsets() {
    // Every identifier operand resolves to the offset recorded in Pass 1
    let program = parse_clean(
        "top:\n  mov rax, rbx\n  jmp top\nmiddle:\n  jmp middle\nend:\n  jmp end\n",
    );
    let output = generate(&program, &table(), None);

    assert!(output.errors.is_empty());
    assert_eq!(output.resolve(".text", "top"), Some(0));
    assert_eq!(output.resolve(".text", "middle"), Some(8));
    assert_eq!(output.resolve(".text", "end"), Some(13));
    assert_eq!(output.resolve(".text", "missing"), None);
}
