//! Textual macro definitions: `%macro name N` ... `%endmacro` blocks with
//! positional `%1`..`%9` placeholders. Macros are templates, not a hygiene
//! system; expansion is pure text substitution.

use crate::preprocessor::LineRecord;
use kasm_error::{ErrorCode, FatalError};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MACRO_DEF: Regex = Regex::new(r"^\s*%macro\s+(\w+)\s+(\d)\s*$").unwrap();
    static ref MACRO_END: Regex = Regex::new(r"^\s*%endmacro\s*$").unwrap();
}

/// One collected macro definition
#[derive(Debug)]
pub struct MacroDefinition {
    pub name: String,
    pub param_count: usize,
    /// Raw body lines between the %macro and %endmacro directives
    pub body: Vec<String>,
    /// Line the definition was opened at
    pub line: usize,
    /// Call matcher, compiled once per macro
    call_pattern: Regex,
}

impl MacroDefinition {
    /// Tries to interpret `text` as a call of this macro.
    ///
    /// ### Returns
    /// The comma-split, trimmed argument list (whitespace-only arguments
    /// dropped) when the line is a call; None otherwise.
    pub fn match_call(&self, text: &str) -> Option<Vec<String>> {
        let captures = self.call_pattern.captures(text)?;
        let args = captures
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or_default()
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        Some(args)
    }

    /// Expands the body with the given arguments substituted for the
    /// positional placeholders. Leading horizontal whitespace is stripped
    /// from each line and blank lines are dropped.
    pub fn expand(&self, args: &[String]) -> Vec<String> {
        self.body
            .iter()
            .map(|line| {
                let mut expanded = line.clone();
                for (i, arg) in args.iter().enumerate() {
                    expanded = expanded.replace(&format!("%{}", i + 1), arg);
                }
                expanded.trim_start_matches([' ', '\t']).to_string()
            })
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// The macros collected from one source, in definition order
#[derive(Debug, Default)]
pub struct MacroTable {
    macros: Vec<MacroDefinition>,
}

/// Index range of a definition block within the scanned lines, inclusive
/// of the %macro and %endmacro directives
#[derive(Debug, Clone, Copy)]
pub struct DefinitionSpan {
    pub start: usize,
    pub end: usize,
}

impl MacroTable {
    /// Scans the working source for `%macro` blocks.
    ///
    /// ### Returns
    /// The collected table plus the index spans of every definition block,
    /// or a fatal error when a block is never closed.
    pub(crate) fn collect(lines: &[LineRecord]) -> Result<(Self, Vec<DefinitionSpan>), FatalError> {
        let mut table = MacroTable::default();
        let mut spans = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let Some(captures) = MACRO_DEF.captures(&lines[i].text) else {
                i += 1;
                continue;
            };

            let name = captures[1].to_string();
            let param_count: usize = captures[2].parse().unwrap_or(0);
            let opened_at = lines[i].line_for_errors(i);
            let mut body = Vec::new();
            let mut closed = false;
            let mut j = i + 1;

            while j < lines.len() {
                if MACRO_END.is_match(&lines[j].text) {
                    closed = true;
                    break;
                }
                body.push(lines[j].text.clone());
                j += 1;
            }

            if !closed {
                return Err(FatalError::new(
                    ErrorCode::MissingEndmacro,
                    format!("macro '{}' missing %endmacro (opened at line {})", name, opened_at),
                    opened_at,
                ));
            }

            let call_pattern = Regex::new(&format!(r"^[^\S\n]*{}\s+(.+)$", regex::escape(&name)))
                .expect("macro call pattern is built from an escaped name");
            table.macros.push(MacroDefinition {
                name,
                param_count,
                body,
                line: opened_at,
                call_pattern,
            });
            spans.push(DefinitionSpan { start: i, end: j });
            i = j + 1;
        }

        Ok((table, spans))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MacroDefinition> {
        self.macros.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.macros.iter().map(|m| m.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}
