use kasm_error::ErrorCode;
use kasm_preprocessor::{FsReader, Preprocessor};
use tempfile::tempdir;

fn preprocess(source: &str) -> Result<String, kasm_error::FatalError> {
    let dir = tempdir().unwrap();
    let mut preprocessor = Preprocessor::new(dir.path(), &FsReader).unwrap();
    preprocessor.preprocess(source).map(|output| output.text)
}

#[test]
fn test_macro_call_expands_with_substituted_arguments() {
    let text = preprocess(
        "%macro load 2\n  mov %1, %2\n%endmacro\nload rax, 42\nret\n",
    )
    .unwrap();

    assert!(text.contains("; MACRO: load"));
    assert!(text.contains("mov rax, 42"));
    assert!(text.contains("ret"));
    assert!(!text.contains("%macro"));
    assert!(!text.contains("%endmacro"));
    assert!(!text.contains("load rax"));
}

#[test]
fn test_expanded_body_lines_lose_leading_whitespace() {
    let text = preprocess("%macro pad 1\n\t\t mov rax, %1\n%endmacro\npad 7\n").unwrap();

    assert!(text.contains("\nmov rax, 7\n") || text.starts_with("mov rax, 7"));
}

#[test]
fn test_blank_body_lines_are_dropped() {
    let text = preprocess("%macro gap 1\n  mov rax, %1\n\n  ret\n%endmacro\ngap 1\n").unwrap();

    assert!(!text.contains("\n\n\n"));
    assert!(text.contains("mov rax, 1"));
    assert!(text.contains("ret"));
}

#[test]
fn test_unused_macro_definitions_are_removed() {
    let text = preprocess("%macro unused 1\n  mov rax, %1\n%endmacro\nret\n").unwrap();

    assert!(!text.contains("%macro"));
    assert!(!text.contains("mov rax"));
    assert!(text.contains("ret"));
}

#[test]
fn test_multiple_calls_expand_independently() {
    let text = preprocess(
        "%macro put 1\n  mov rax, %1\n%endmacro\nput 1\nput 2\n",
    )
    .unwrap();

    assert!(text.contains("mov rax, 1"));
    assert!(text.contains("mov rax, 2"));
    assert_eq!(text.matches("; MACRO: put").count(), 2);
}

#[test]
fn test_missing_endmacro_is_fatal() {
    let error = preprocess("ret\n%macro broken 1\n  mov rax, %1\n").unwrap_err();

    assert_eq!(error.code, ErrorCode::MissingEndmacro);
    assert!(error.message.contains("broken"));
    assert!(error.message.contains("line 2"));
}

#[test]
fn test_wrong_argument_count_is_fatal() {
    let error = preprocess(
        "%macro pair 2\n  mov %1, %2\n%endmacro\npair rax\n",
    )
    .unwrap_err();

    assert_eq!(error.code, ErrorCode::MacroArgumentCount);
    assert!(error.message.contains("pair"));
    assert!(error.message.contains("expects 2 argument(s), got 1"));
}

#[test]
fn test_whitespace_only_arguments_are_dropped() {
    // "rax,  , rbx" carries a whitespace-only argument which is dropped,
    // leaving two
    let text = preprocess(
        "%macro pair 2\n  mov %1, %2\n%endmacro\npair rax,  , rbx\n",
    )
    .unwrap();

    assert!(text.contains("mov rax, rbx"));
}

#[test]
fn test_macro_name_counts_as_defined_symbol() {
    let text = preprocess(
        "%macro helper 1\n  mov rax, %1\n%endmacro\n%ifdef helper\nyes_defined:\n%endif\n",
    )
    .unwrap();

    assert!(text.contains("yes_defined:"));
}
