use kasm_arch::{ArchitectureProfile, InstructionTable, x86_64};
use kasm_backend::CodegenOutput;
use kasm_error::{FatalError, Severity};
use kasm_ir::{Program, Token};
use kasm_preprocessor::{DependencyGraph, FsReader, Preprocessor, SourceReader};
use kasm_shared::{DiagnosticContext, LineOriginMap};
use std::path::PathBuf;
use tracing::debug;

/// A composable assembly pipeline with explicit stage boundaries.
///
/// Stages run in order: preprocess (dependency graph + textual rewrite),
/// tokenize, parse, analyze, codegen. Every stage records its findings in
/// the shared diagnostic context; a stage with errors fails the pipeline,
/// so no output is produced from a program that did not assemble cleanly.
pub struct AssemblyPipeline {
    /// The diagnostic context every stage records into
    context: DiagnosticContext,
    /// Lexer vocabulary
    profile: ArchitectureProfile,
    /// Instruction-variant table for analysis and encoding
    table: InstructionTable,
    /// Path of the root source file
    input: PathBuf,
    /// Directory include paths resolve against
    cwd: PathBuf,
    /// Symbols defined before preprocessing starts
    defines: Vec<String>,
    /// Origin map produced by the preprocessor
    line_map: Option<LineOriginMap>,
}

impl AssemblyPipeline {
    /// Creates a pipeline for the given root file with the built-in
    /// x86_64 architecture data.
    ///
    /// ### Arguments
    /// * `input` - Path of the root `.kasm` file
    /// * `cwd` - Working directory for include resolution
    pub fn new(input: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        let input = input.into();
        AssemblyPipeline {
            context: DiagnosticContext::new(input.display().to_string()),
            profile: x86_64::profile(),
            table: x86_64::instruction_table(),
            input,
            cwd: cwd.into(),
            defines: Vec::new(),
            line_map: None,
        }
    }

    /// Replaces the architecture data (profile and instruction table)
    pub fn with_architecture(mut self, profile: ArchitectureProfile, table: InstructionTable) -> Self {
        self.profile = profile;
        self.table = table;
        self
    }

    /// Seeds preprocessor symbols (the `-D` flags)
    pub fn with_defines<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defines.extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn diagnostics(&self) -> &DiagnosticContext {
        &self.context
    }

    /// Builds the dependency graph and preprocesses the root source.
    ///
    /// Fatal errors from either stage are recorded in the context and fail
    /// the pipeline; an include cycle fails it as well.
    pub fn preprocess(mut self) -> PipelineStage<String> {
        let reader = FsReader;

        self.context.set_phase("dependency-graph");
        debug!(input = %self.input.display(), "building dependency graph");

        let source = match reader.read(&self.input) {
            Ok(source) => source,
            Err(e) => {
                let location = self.context.loc(0, 0);
                self.context.record(
                    Severity::Error,
                    location,
                    format!("could not read '{}': {}", self.input.display(), e),
                );
                return PipelineStage::Failed { pipeline: self };
            }
        };

        let graph = match DependencyGraph::build(&source, &self.cwd, Some(self.input.as_path()), &reader) {
            Ok(graph) => graph,
            Err(fatal) => {
                self.record_fatal(&fatal);
                return PipelineStage::Failed { pipeline: self };
            }
        };
        if let Some(cycle) = graph.cycle_path() {
            let location = self.context.loc(0, 0);
            self.context.record(
                Severity::Error,
                location,
                format!("include cycle detected: {}", cycle.join(" -> ")),
            );
            return PipelineStage::Failed { pipeline: self };
        }

        self.context.set_phase("preprocessor");
        debug!("preprocessing");

        let preprocessor = match Preprocessor::new(self.cwd.clone(), &reader) {
            Ok(preprocessor) => preprocessor,
            Err(fatal) => {
                self.record_fatal(&fatal);
                return PipelineStage::Failed { pipeline: self };
            }
        };
        let mut preprocessor = preprocessor
            .with_symbols(self.defines.iter().cloned())
            .with_diagnostics(&self.context);

        match preprocessor.preprocess(&source) {
            Ok(output) => {
                drop(preprocessor);
                self.line_map = Some(output.line_map);
                PipelineStage::Success {
                    pipeline: self,
                    data: output.text,
                }
            }
            Err(fatal) => {
                drop(preprocessor);
                self.record_fatal(&fatal);
                PipelineStage::Failed { pipeline: self }
            }
        }
    }

    /// Tokenizes the preprocessed source. The lexer never fails; defects
    /// degrade to warnings in the context.
    pub fn tokenize(self, text: String) -> PipelineStage<Vec<Token>> {
        self.context.set_phase("lexer");
        debug!("tokenizing");

        let tokens = kasm_frontend::lexer::tokenize(&text, &self.profile, Some(&self.context));

        #[cfg(feature = "print-tokens")]
        kasm_frontend::token_printer::print_tokens(&tokens);

        PipelineStage::Success {
            pipeline: self,
            data: tokens,
        }
    }

    /// Parses the token stream; parse errors fail the pipeline after all
    /// of them have been recorded.
    pub fn parse(self, tokens: Vec<Token>) -> PipelineStage<Program> {
        self.context.set_phase("parser");
        debug!("parsing");

        let output = kasm_frontend::parser::parse(&tokens);

        #[cfg(feature = "print-ast")]
        {
            println!("=== AST ===");
            kasm_ir::ast_printer::AstPrinter::new().print(&output.program);
        }

        for error in &output.errors {
            let line = self.translate(error.line);
            let location = self.context.loc(line, error.column + 1);
            self.context
                .record(Severity::Error, location, error.message.clone());
        }

        if output.errors.is_empty() {
            PipelineStage::Success {
                pipeline: self,
                data: output.program,
            }
        } else {
            PipelineStage::Failed { pipeline: self }
        }
    }

    /// Runs semantic analysis; the analyzer records its own diagnostics
    /// with translated line numbers.
    pub fn analyze(self, program: Program) -> PipelineStage<Program> {
        self.context.set_phase("semantic-analyzer");
        debug!("analyzing");

        let output = kasm_frontend::semantic_analysis::analyze(
            &program,
            &self.table,
            Some(&self.context),
            self.line_map.as_ref(),
        );

        if output.is_ok() {
            PipelineStage::Success {
                pipeline: self,
                data: program,
            }
        } else {
            PipelineStage::Failed { pipeline: self }
        }
    }

    /// Generates the byte image; codegen errors fail the pipeline after
    /// being recorded.
    pub fn codegen(self, program: Program) -> AssemblyResult {
        self.context.set_phase("code-generator");
        debug!("generating code");

        let output = kasm_backend::generate(&program, &self.table, Some(&self.context));
        for error in &output.errors {
            let line = self.translate(error.line);
            let location = self.context.loc(line, error.column + 1);
            self.context
                .record(Severity::Error, location, error.message.clone());
        }

        if output.is_ok() {
            AssemblyResult::Success {
                output,
                context: self.context,
            }
        } else {
            AssemblyResult::Failed {
                context: self.context,
            }
        }
    }

    /// Terminates the pipeline early, keeping the collected diagnostics
    pub fn finish(self) -> AssemblyResult {
        AssemblyResult::Failed {
            context: self.context,
        }
    }

    fn record_fatal(&self, fatal: &FatalError) {
        let location = self.context.loc(fatal.line, 0);
        self.context
            .record(Severity::Error, location, fatal.message.clone());
    }

    fn translate(&self, line: usize) -> usize {
        self.line_map.as_ref().map_or(line, |map| map.translate(line))
    }
}

/// Represents a stage boundary in the pipeline: either the stage produced
/// data for the next stage, or it failed and the pipeline stops.
pub enum PipelineStage<T> {
    Success {
        pipeline: AssemblyPipeline,
        data: T,
    },
    Failed {
        pipeline: AssemblyPipeline,
    },
}

impl<T> PipelineStage<T> {
    /// Chains stages, continuing only on success
    pub fn and_then<U, F>(self, f: F) -> PipelineStage<U>
    where
        F: FnOnce(AssemblyPipeline, T) -> PipelineStage<U>,
    {
        match self {
            PipelineStage::Success { pipeline, data } => f(pipeline, data),
            PipelineStage::Failed { pipeline } => PipelineStage::Failed { pipeline },
        }
    }
}

/// The final result of an assembly run
pub enum AssemblyResult {
    /// Assembly succeeded; the image is ready to write
    Success {
        output: CodegenOutput,
        context: DiagnosticContext,
    },
    /// Assembly failed; the context holds every recorded finding
    Failed {
        context: DiagnosticContext,
    },
}

impl AssemblyResult {
    pub fn context(&self) -> &DiagnosticContext {
        match self {
            AssemblyResult::Success { context, .. } => context,
            AssemblyResult::Failed { context } => context,
        }
    }
}

/// Runs the complete pipeline for a root file.
///
/// ### Arguments
/// * `input` - Path of the root `.kasm` file
/// * `cwd` - Working directory for include resolution
/// * `defines` - Symbols defined before preprocessing
///
/// ### Returns
/// The final assembly result with the populated diagnostic context
pub fn assemble<I, S>(input: impl Into<PathBuf>, cwd: impl Into<PathBuf>, defines: I) -> AssemblyResult
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let pipeline = AssemblyPipeline::new(input, cwd).with_defines(defines);

    match pipeline
        .preprocess()
        .and_then(|pipeline, text| pipeline.tokenize(text))
        .and_then(|pipeline, tokens| pipeline.parse(tokens))
        .and_then(|pipeline, program| pipeline.analyze(program))
    {
        PipelineStage::Success { pipeline, data } => pipeline.codegen(data),
        PipelineStage::Failed { pipeline } => pipeline.finish(),
    }
}
