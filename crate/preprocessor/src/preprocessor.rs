//! The line-oriented textual preprocessor.
//!
//! Processing order: includes, then macros (definition, call collection,
//! expansion), then conditionals, then `%define` stripping. The source is
//! held as a vector of line records carrying each line's origin, so the
//! line-origin map handed to later stages falls out of the rewrite itself.

use crate::macros::MacroTable;
use crate::source_reader::SourceReader;
use kasm_error::{ErrorCode, FatalError, Severity};
use kasm_shared::{DiagnosticContext, LineOriginMap};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref INCLUDE: Regex = Regex::new(r#"^\s*%include\s+"([^"]+)"\s*$"#).unwrap();
    static ref DEFINE: Regex = Regex::new(r"^\s*%define\s+(\w+)\s*$").unwrap();
    static ref DEFINE_EMPTY: Regex = Regex::new(r"^\s*%define\s*$").unwrap();
    static ref CONDITIONAL_OPEN: Regex = Regex::new(r"^\s*%(ifdef|ifndef)\s+(\w+)\s*$").unwrap();
    static ref CONDITIONAL_ELSE: Regex = Regex::new(r"^\s*%else\s*$").unwrap();
    static ref CONDITIONAL_END: Regex = Regex::new(r"^\s*%endif\s*$").unwrap();
}

/// The file extension every include must carry
const SOURCE_EXTENSION: &str = "kasm";

/// One line of the working source together with its origin: the 1-based
/// line number the text came from, or None for synthesized lines.
#[derive(Debug, Clone)]
pub(crate) struct LineRecord {
    pub text: String,
    pub origin: Option<usize>,
}

impl LineRecord {
    fn source(text: impl Into<String>, origin: usize) -> Self {
        LineRecord {
            text: text.into(),
            origin: Some(origin),
        }
    }

    fn synthesized(text: impl Into<String>) -> Self {
        LineRecord {
            text: text.into(),
            origin: None,
        }
    }

    /// Origin line for error messages, falling back to the position in the
    /// working buffer when the line was synthesized.
    pub fn line_for_errors(&self, index: usize) -> usize {
        self.origin.unwrap_or(index + 1)
    }
}

/// A processed `%include` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inclusion {
    /// Resolved path of the included file
    pub path: PathBuf,
    /// Line number of the `%include` directive
    pub line: usize,
}

/// Result of one preprocessor invocation
#[derive(Debug)]
pub struct PreprocessOutput {
    /// The rewritten source, ready for the lexer
    pub text: String,
    /// Translation from preprocessed line numbers back to source lines
    pub line_map: LineOriginMap,
    /// Every include that was inlined, in processing order
    pub inclusions: Vec<Inclusion>,
}

/// The textual preprocessor
pub struct Preprocessor<'a> {
    cwd: PathBuf,
    reader: &'a dyn SourceReader,
    diagnostics: Option<&'a DiagnosticContext>,
    /// Symbols considered defined before any %define is read
    symbols: HashSet<String>,
}

impl<'a> std::fmt::Debug for Preprocessor<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preprocessor")
            .field("cwd", &self.cwd)
            .field("symbols", &self.symbols)
            .finish()
    }
}

impl<'a> Preprocessor<'a> {
    /// Creates a preprocessor rooted at the given working directory.
    ///
    /// ### Arguments
    /// * `cwd` - Directory relative include paths resolve against
    /// * `reader` - File access hooks
    ///
    /// ### Returns
    /// The preprocessor, or a fatal error when `cwd` is not a directory
    pub fn new(cwd: impl Into<PathBuf>, reader: &'a dyn SourceReader) -> Result<Self, FatalError> {
        let cwd = cwd.into();
        if !reader.is_dir(&cwd) {
            return Err(FatalError::new(
                ErrorCode::InvalidWorkingDirectory,
                format!("working directory '{}' does not exist", cwd.display()),
                0,
            )
            .with_path(cwd));
        }
        Ok(Preprocessor {
            cwd,
            reader,
            diagnostics: None,
            symbols: HashSet::new(),
        })
    }

    /// Seeds the defined-symbol set consulted by conditionals
    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols.extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Attaches a diagnostic sink for info entries
    pub fn with_diagnostics(mut self, context: &'a DiagnosticContext) -> Self {
        self.diagnostics = Some(context);
        self
    }

    /// Runs every preprocessing phase over the source.
    ///
    /// ### Arguments
    /// * `source` - The root source text
    ///
    /// ### Returns
    /// The rewritten source with its line-origin map and inclusion records,
    /// or the first fatal error encountered
    pub fn preprocess(&mut self, source: &str) -> Result<PreprocessOutput, FatalError> {
        let mut lines: Vec<LineRecord> = source
            .lines()
            .enumerate()
            .map(|(i, text)| LineRecord::source(text, i + 1))
            .collect();
        let mut inclusions = Vec::new();

        let mut inlined = HashSet::new();
        lines = self.expand_includes(lines, &mut inlined, &mut inclusions)?;
        lines = self.process_macros(lines)?;
        self.collect_defines(&lines)?;
        lines = self.apply_conditionals(lines)?;
        lines.retain(|record| !is_define_line(&record.text));

        let mut line_map = LineOriginMap::new();
        let mut text = String::new();
        for record in &lines {
            line_map.push(record.origin);
            text.push_str(&record.text);
            text.push('\n');
        }

        if let Some(context) = self.diagnostics {
            context.record(
                Severity::Info,
                context.loc(0, 0),
                format!(
                    "preprocessing complete: {} line(s), {} include(s)",
                    lines.len(),
                    inclusions.len()
                ),
            );
        }

        Ok(PreprocessOutput {
            text,
            line_map,
            inclusions,
        })
    }

    /// Expands `%include` directives. The first occurrence of a path is
    /// inlined between `; FILE:` / `; END FILE:` comments. The inlined-path
    /// set threads through every nested expansion, so a later occurrence of
    /// the same path anywhere in the tree is stripped without re-reading.
    fn expand_includes(
        &self,
        lines: Vec<LineRecord>,
        inlined: &mut HashSet<PathBuf>,
        inclusions: &mut Vec<Inclusion>,
    ) -> Result<Vec<LineRecord>, FatalError> {
        let mut output = Vec::with_capacity(lines.len());

        for (index, record) in lines.iter().enumerate() {
            let Some(captures) = INCLUDE.captures(&record.text) else {
                output.push(record.clone());
                continue;
            };

            let line = record.line_for_errors(index);
            let raw_path = &captures[1];
            let resolved = self.resolve_include(raw_path, line)?;

            if inlined.contains(&resolved) {
                // Shared dependency: already inlined somewhere, strip
                continue;
            }

            let content = self.reader.read(&resolved).map_err(|e| {
                FatalError::new(
                    ErrorCode::UnreadableInclude,
                    format!("could not read include '{}' (line {}): {}", raw_path, line, e),
                    line,
                )
                .with_path(resolved.clone())
            })?;

            inlined.insert(resolved.clone());
            inclusions.push(Inclusion {
                path: resolved.clone(),
                line,
            });

            // Included lines keep the directive's line as their origin;
            // the map carries line numbers only.
            let nested: Vec<LineRecord> = content
                .trim()
                .lines()
                .map(|text| LineRecord::source(text, line))
                .collect();
            let nested = self.expand_includes(nested, inlined, inclusions)?;

            output.push(LineRecord::synthesized(format!(
                "; FILE: {}",
                resolved.display()
            )));
            output.extend(nested);
            output.push(LineRecord::synthesized(format!(
                "; END FILE: {}",
                resolved.display()
            )));
        }

        Ok(output)
    }

    /// Resolves an include path against the working directory, enforcing
    /// the `.kasm` extension.
    fn resolve_include(&self, raw: &str, line: usize) -> Result<PathBuf, FatalError> {
        let path = Path::new(raw);
        if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            return Err(FatalError::new(
                ErrorCode::InvalidIncludeExtension,
                format!("include '{}' must have the .kasm extension (line {})", raw, line),
                line,
            )
            .with_path(path.to_path_buf()));
        }
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.cwd.join(path))
        }
    }

    /// Collects macro definitions, removes the definition blocks, records
    /// the macro names as defined symbols, and expands every call.
    fn process_macros(&mut self, lines: Vec<LineRecord>) -> Result<Vec<LineRecord>, FatalError> {
        let (table, spans) = MacroTable::collect(&lines)?;
        if table.is_empty() {
            return Ok(lines);
        }

        self.symbols.extend(table.names().map(str::to_string));

        // Drop every definition block, used or not
        let mut in_definition = vec![false; lines.len()];
        for span in &spans {
            for flag in in_definition.iter_mut().take(span.end + 1).skip(span.start) {
                *flag = true;
            }
        }
        let body: Vec<LineRecord> = lines
            .into_iter()
            .zip(in_definition)
            .filter(|(_, inside)| !inside)
            .map(|(record, _)| record)
            .collect();

        self.expand_macro_calls(body, &table)
    }

    /// Replaces each macro call line with the expanded body wrapped in a
    /// `; MACRO:` marker. Call arity must match the definition exactly.
    fn expand_macro_calls(
        &self,
        lines: Vec<LineRecord>,
        table: &MacroTable,
    ) -> Result<Vec<LineRecord>, FatalError> {
        let mut output = Vec::with_capacity(lines.len());

        for (index, record) in lines.iter().enumerate() {
            let mut expanded = None;

            for definition in table.iter() {
                let Some(args) = definition.match_call(&record.text) else {
                    continue;
                };
                let line = record.line_for_errors(index);
                if args.len() != definition.param_count {
                    return Err(FatalError::new(
                        ErrorCode::MacroArgumentCount,
                        format!(
                            "macro '{}' expects {} argument(s), got {} (line {})",
                            definition.name,
                            definition.param_count,
                            args.len(),
                            line
                        ),
                        line,
                    ));
                }

                let mut block = Vec::new();
                block.push(LineRecord::synthesized(format!(
                    "; MACRO: {}",
                    definition.name
                )));
                for body_line in definition.expand(&args) {
                    // Expanded lines point at the call site
                    block.push(LineRecord::source(body_line, line));
                }
                expanded = Some(block);
                break;
            }

            match expanded {
                Some(block) => output.extend(block),
                None => output.push(record.clone()),
            }
        }

        Ok(output)
    }

    /// Collects `%define` symbols. Empty names and duplicates are fatal.
    fn collect_defines(&mut self, lines: &[LineRecord]) -> Result<(), FatalError> {
        let mut seen: Vec<(String, usize)> = Vec::new();

        for (index, record) in lines.iter().enumerate() {
            let line = record.line_for_errors(index);
            if DEFINE_EMPTY.is_match(&record.text) {
                return Err(FatalError::new(
                    ErrorCode::EmptyDefineName,
                    format!("%define with empty symbol name (line {})", line),
                    line,
                ));
            }
            let Some(captures) = DEFINE.captures(&record.text) else {
                continue;
            };
            let name = &captures[1];

            if let Some((_, first_line)) = seen.iter().find(|(n, _)| n == name) {
                return Err(FatalError::new(
                    ErrorCode::DuplicateDefine,
                    format!(
                        "symbol '{}' defined at line {} and line {}",
                        name, first_line, line
                    ),
                    line,
                ));
            }

            seen.push((name.to_string(), line));
            self.symbols.insert(name.to_string());
        }

        Ok(())
    }

    /// Evaluates `%ifdef`/`%ifndef`/`%else`/`%endif` blocks.
    ///
    /// Two passes: the first matches directives with a stack and collects
    /// completed blocks, the second rewrites the buffer in ascending source
    /// order, emitting only the active branch. Nested blocks inside an
    /// emitted branch are NOT reprocessed; their directives pass through
    /// verbatim. This mirrors the known limitation of the original
    /// conditional handling.
    fn apply_conditionals(
        &self,
        lines: Vec<LineRecord>,
    ) -> Result<Vec<LineRecord>, FatalError> {
        struct Frame {
            start: usize,
            line: usize,
            negated: bool,
            symbol: String,
            else_index: Option<usize>,
        }
        struct Block {
            start: usize,
            end: usize,
            negated: bool,
            symbol: String,
            else_index: Option<usize>,
        }

        // Pass 1: match directives left to right
        let mut stack: Vec<Frame> = Vec::new();
        let mut blocks: Vec<Block> = Vec::new();

        for (index, record) in lines.iter().enumerate() {
            let line = record.line_for_errors(index);

            if let Some(captures) = CONDITIONAL_OPEN.captures(&record.text) {
                stack.push(Frame {
                    start: index,
                    line,
                    negated: &captures[1] == "ifndef",
                    symbol: captures[2].to_string(),
                    else_index: None,
                });
            } else if CONDITIONAL_ELSE.is_match(&record.text) {
                let Some(frame) = stack.last_mut() else {
                    return Err(FatalError::new(
                        ErrorCode::UnmatchedElse,
                        format!("%else without matching %ifdef/%ifndef (line {})", line),
                        line,
                    ));
                };
                if frame.else_index.is_some() {
                    return Err(FatalError::new(
                        ErrorCode::DuplicateElse,
                        format!(
                            "duplicate %else in conditional opened at line {} (line {})",
                            frame.line, line
                        ),
                        line,
                    ));
                }
                frame.else_index = Some(index);
            } else if CONDITIONAL_END.is_match(&record.text) {
                let Some(frame) = stack.pop() else {
                    return Err(FatalError::new(
                        ErrorCode::UnmatchedEndif,
                        format!("%endif without matching %ifdef/%ifndef (line {})", line),
                        line,
                    ));
                };
                blocks.push(Block {
                    start: frame.start,
                    end: index,
                    negated: frame.negated,
                    symbol: frame.symbol,
                    else_index: frame.else_index,
                });
            }
        }

        if let Some(frame) = stack.first() {
            return Err(FatalError::new(
                ErrorCode::UnterminatedConditional,
                format!("conditional opened at line {} never closed", frame.line),
                frame.line,
            ));
        }

        if blocks.is_empty() {
            return Ok(lines);
        }

        // Pass 2: rewrite in ascending source order. Blocks starting before
        // the cursor are nested inside an already-handled block and skipped.
        blocks.sort_by_key(|b| b.start);

        let mut output = Vec::with_capacity(lines.len());
        let mut cursor = 0;

        for block in &blocks {
            if block.start < cursor {
                continue;
            }
            output.extend(lines[cursor..block.start].iter().cloned());

            let defined = self.symbols.contains(&block.symbol);
            let active = defined != block.negated;
            let branch: &[LineRecord] = if active {
                let end = block.else_index.unwrap_or(block.end);
                &lines[block.start + 1..end]
            } else if let Some(else_index) = block.else_index {
                &lines[else_index + 1..block.end]
            } else {
                &[]
            };
            output.extend(trimmed(branch).iter().cloned());

            cursor = block.end + 1;
        }
        output.extend(lines[cursor..].iter().cloned());

        Ok(output)
    }
}

/// True for a `%define` line (stripped after conditionals have run)
fn is_define_line(text: &str) -> bool {
    DEFINE.is_match(text)
}

/// Drops leading and trailing blank lines of a branch
fn trimmed(branch: &[LineRecord]) -> &[LineRecord] {
    let start = branch
        .iter()
        .position(|r| !r.text.trim().is_empty())
        .unwrap_or(branch.len());
    let end = branch
        .iter()
        .rposition(|r| !r.text.trim().is_empty())
        .map_or(start, |i| i + 1);
    &branch[start..end]
}
