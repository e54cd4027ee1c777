//! Two-pass semantic verification of a parsed program.
//!
//! Pass 1 collects the label, namespace, and module tables; Pass 2
//! validates every statement against the instruction table and the
//! collected symbols. The passes are independent: validation runs even
//! when collection reported errors, and forward label references are legal
//! because collection completes first.

mod validation;

pub use validation::operand_signature;

use kasm_arch::InstructionTable;
use kasm_error::{ErrorCode, SemanticError, Severity};
use kasm_ir::{Program, Statement};
use kasm_shared::{DiagnosticContext, LineOriginMap};
use std::collections::HashMap;

/// Result of semantic analysis: the accumulated errors, with line numbers
/// referring to the preprocessed source (the diagnostic context receives
/// translated, user-visible line numbers when a line map is attached).
#[derive(Debug)]
pub struct AnalysisOutput {
    pub errors: Vec<SemanticError>,
}

impl AnalysisOutput {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Position a symbol was first declared at
#[derive(Debug, Clone, Copy)]
struct SymbolEntry {
    line: usize,
    column: usize,
}

pub(crate) struct SemanticAnalyzer<'a> {
    table: &'a InstructionTable,
    labels: HashMap<String, SymbolEntry>,
    namespaces: HashMap<String, SymbolEntry>,
    modules: HashMap<String, SymbolEntry>,
    errors: Vec<SemanticError>,
    diagnostics: Option<&'a DiagnosticContext>,
    line_map: Option<&'a LineOriginMap>,
}

/// Runs both analysis passes over the program
///
/// ### Arguments
/// * `program` - The parsed statements
/// * `table` - The instruction-variant table to validate against
/// * `diagnostics` - Optional diagnostic sink
/// * `line_map` - Optional translation of preprocessed line numbers
///
/// ### Returns
/// The accumulated semantic errors (empty on success)
pub fn analyze(
    program: &Program,
    table: &InstructionTable,
    diagnostics: Option<&DiagnosticContext>,
    line_map: Option<&LineOriginMap>,
) -> AnalysisOutput {
    let mut analyzer = SemanticAnalyzer {
        table,
        labels: HashMap::new(),
        namespaces: HashMap::new(),
        modules: HashMap::new(),
        errors: Vec::new(),
        diagnostics,
        line_map,
    };

    analyzer.collect(program);
    analyzer.validate(program);

    AnalysisOutput {
        errors: analyzer.errors,
    }
}

impl<'a> SemanticAnalyzer<'a> {
    /// Pass 1: builds the label, namespace, and module tables. Duplicates
    /// are reported and the first entry kept.
    fn collect(&mut self, program: &Program) {
        for statement in program {
            match statement {
                Statement::Label(label) => {
                    Self::collect_symbol(
                        &mut self.labels,
                        &mut self.errors,
                        self.diagnostics,
                        self.line_map,
                        "label",
                        &label.name,
                        label.line,
                        label.column,
                    );
                }
                Statement::Namespace(namespace) => {
                    Self::collect_symbol(
                        &mut self.namespaces,
                        &mut self.errors,
                        self.diagnostics,
                        self.line_map,
                        "namespace",
                        &namespace.name,
                        namespace.line,
                        namespace.column,
                    );
                }
                Statement::Use(import) => {
                    Self::collect_symbol(
                        &mut self.modules,
                        &mut self.errors,
                        self.diagnostics,
                        self.line_map,
                        "module",
                        &import.module_name,
                        import.line,
                        import.column,
                    );
                }
                _ => {}
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_symbol(
        table: &mut HashMap<String, SymbolEntry>,
        errors: &mut Vec<SemanticError>,
        diagnostics: Option<&DiagnosticContext>,
        line_map: Option<&LineOriginMap>,
        kind: &str,
        name: &str,
        line: usize,
        column: usize,
    ) {
        if let Some(previous) = table.get(name) {
            let message = format!(
                "duplicate {} '{}', previously declared at {}:{}",
                kind, name, previous.line, previous.column
            );
            errors.push(SemanticError::new(
                ErrorCode::DuplicateSymbol,
                message.clone(),
                line,
                column,
            ));
            if let Some(context) = diagnostics {
                let visible = line_map.map_or(line, |m| m.translate(line));
                context.record(Severity::Error, context.loc(visible, column + 1), message);
            }
            return;
        }
        table.insert(name.to_string(), SymbolEntry { line, column });
    }

    /// Pass 2: validates every statement against the instruction table and
    /// the collected symbols.
    fn validate(&mut self, program: &Program) {
        for statement in program {
            match statement {
                Statement::Instruction(instruction) => self.validate_instruction(instruction),
                Statement::Namespace(namespace) => self.validate_namespace(namespace),
                Statement::Use(import) => self.validate_use(import),
                Statement::Directive(directive) => self.validate_directive(directive),
                Statement::Label(_) | Statement::Section(_) => {}
            }
        }
    }

    /// True when the name resolves to a collected label
    fn is_defined_label(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    /// Records a semantic error, translating the line number for the
    /// diagnostic context while the internal list keeps the preprocessed
    /// number for cross-referencing.
    fn record(&mut self, code: ErrorCode, message: String, line: usize, column: usize) {
        self.errors
            .push(SemanticError::new(code, message.clone(), line, column));
        if let Some(context) = self.diagnostics {
            let visible = self.line_map.map_or(line, |m| m.translate(line));
            context.record(Severity::Error, context.loc(visible, column + 1), message);
        }
    }
}
