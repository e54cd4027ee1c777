use crate::test_utils::{parse_clean, table};
use kasm_frontend::semantic_analysis::analyze;
use kasm_ir::{NamespaceStmt, Statement, UseStmt};
use kasm_shared::{DiagnosticContext, LineOriginMap};

#[test]
fn test_duplicate_label_reports_first_declaration() {
    let program = parse_clean("first:\nret\nfirst:\n");
    let output = analyze(&program, &table(), None, None);

    assert_eq!(output.errors.len(), 1);
    assert_eq!(
        output.errors[0].message,
        "duplicate label 'first', previously declared at 1:0"
    );
    assert_eq!(output.errors[0].line, 3);
}

#[test]
fn test_duplicate_namespace_and_module() {
    let program = parse_clean("namespace a\nnamespace a\nuse m\nuse m\n");
    let output = analyze(&program, &table(), None, None);

    assert_eq!(output.errors.len(), 2);
    assert!(output.errors[0].message.contains("duplicate namespace 'a'"));
    assert!(output.errors[1].message.contains("duplicate module 'm'"));
}

#[test]
fn test_first_declaration_wins() {
    // The duplicate must not overwrite the original entry; a reference
    // resolving against the table still succeeds
    let program = parse_clean("target:\ntarget:\njmp target\n");
    let output = analyze(&program, &table(), None, None);

    assert_eq!(output.errors.len(), 1);
    assert!(output.errors[0].message.contains("duplicate label"));
}

#[test]
fn test_label_names_are_case_sensitive() {
    let program = parse_clean("Main:\nmain:\nret\n");
    let output = analyze(&program, &table(), None, None);

    assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
}

#[test]
fn test_namespace_name_must_not_start_with_digit() {
    let program = vec![Statement::Namespace(NamespaceStmt {
        name: "9lives".to_string(),
        line: 1,
        column: 0,
    })];
    let output = analyze(&program, &table(), None, None);

    assert_eq!(output.errors.len(), 1);
    assert!(
        output.errors[0]
            .message
            .contains("namespace name '9lives' cannot start with a digit")
    );
}

#[test]
fn test_empty_namespace_and_module_names() {
    let program = vec![
        Statement::Namespace(NamespaceStmt {
            name: String::new(),
            line: 1,
            column: 0,
        }),
        Statement::Use(UseStmt {
            module_name: String::new(),
            line: 2,
            column: 0,
        }),
    ];
    let output = analyze(&program, &table(), None, None);

    assert_eq!(output.errors.len(), 2);
    assert!(output.errors[0].message.contains("namespace name cannot be empty"));
    assert!(output.errors[1].message.contains("module name in 'use' cannot be empty"));
}

#[test]
fn test_diagnostics_use_translated_lines_but_error_list_keeps_preprocessed() {
    // Preprocessed line 2 came from source line 7
    let mut map = LineOriginMap::new();
    map.push(None);
    map.push(Some(7));

    let context = DiagnosticContext::new("main.kasm");
    let program = parse_clean("ret\njmp nowhere\n");
    let output = analyze(&program, &table(), Some(&context), Some(&map));

    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].line, 2);

    let entries = context.errors();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].location.line, 7);
}
