use kasm_error::ErrorCode;
use kasm_preprocessor::{FsReader, Preprocessor};
use tempfile::tempdir;

fn preprocess(source: &str) -> Result<kasm_preprocessor::PreprocessOutput, kasm_error::FatalError> {
    let dir = tempdir().unwrap();
    let mut preprocessor = Preprocessor::new(dir.path(), &FsReader).unwrap();
    preprocessor.preprocess(source)
}

#[test]
fn test_defined_symbol_satisfies_ifdef() {
    let output = preprocess("%define FEATURE\n%ifdef FEATURE\nenabled:\n%endif\n").unwrap();

    assert!(output.text.contains("enabled:"));
}

#[test]
fn test_define_lines_are_stripped_from_the_output() {
    let output = preprocess("%define FEATURE\nmov rax, rbx\n").unwrap();

    assert!(!output.text.contains("%define"));
    assert!(output.text.contains("mov rax, rbx"));
}

#[test]
fn test_line_origins_skip_stripped_defines() {
    let output = preprocess("%define A\nmov rax, rbx\n").unwrap();

    // The single surviving line came from source line 2
    assert_eq!(output.line_map.len(), 1);
    assert_eq!(output.line_map.origin_of(1), Some(2));
}

#[test]
fn test_empty_define_name_is_fatal() {
    let error = preprocess("%define\n").unwrap_err();

    assert_eq!(error.code, ErrorCode::EmptyDefineName);
    assert!(error.message.contains("line 1"));
}

#[test]
fn test_duplicate_define_reports_both_lines() {
    let error = preprocess("%define A\nret\n%define A\n").unwrap_err();

    assert_eq!(error.code, ErrorCode::DuplicateDefine);
    assert_eq!(
        error.message,
        "symbol 'A' defined at line 1 and line 3"
    );
}
