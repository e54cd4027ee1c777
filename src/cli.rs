use crate::error::{CliError, CliResult};
use crate::exit;
use clap::{Parser as ClapParser, Subcommand};
use colored::Colorize;
use kasm::{AssemblyPipeline, AssemblyResult, PipelineStage, assemble};
use kasm_preprocessor::{DependencyGraph, FsReader, SourceReader};
use std::fs;
use std::path::{Path, PathBuf};

/// Command line interface for the kasm assembler
#[derive(ClapParser)]
#[command(
    version,
    about = "kasm x86_64 assembler",
    long_about = r#"kasm assembles a NASM-flavored x86_64 dialect into a flat machine-code
image. Sources are preprocessed (includes, macros, conditionals), checked,
and encoded section by section."#,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the kasm CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Assemble a source file into a flat byte image
    Assemble {
        /// Input source file
        input: String,

        /// Output image file (default: same as input with .bin extension)
        #[arg(short, long)]
        output: Option<String>,

        /// Define a preprocessor symbol (may be repeated)
        #[arg(short = 'D', long = "define", value_name = "SYMBOL")]
        defines: Vec<String>,

        /// Also print trace diagnostics
        #[arg(long)]
        verbose: bool,
    },

    /// Run the pipeline through semantic analysis without emitting output
    Check {
        /// Input source file
        input: String,

        /// Define a preprocessor symbol (may be repeated)
        #[arg(short = 'D', long = "define", value_name = "SYMBOL")]
        defines: Vec<String>,
    },

    /// Print the include dependency graph of a source file
    Graph {
        /// Input source file
        input: String,

        /// Emit Graphviz DOT instead of a tree
        #[arg(long)]
        dot: bool,
    },
}

/// The extension kasm sources must carry
const SOURCE_EXTENSION: &str = "kasm";
/// The extension of emitted images
const IMAGE_EXTENSION: &str = "bin";

/// Assemble a source file and write the byte image
///
/// ### Arguments
/// * `input` - The input source file
/// * `output` - Optional output path; derived from the input otherwise
/// * `defines` - Preprocessor symbols defined up front
/// * `verbose` - Whether trace diagnostics are printed
pub fn assemble_file(
    input: &str,
    output: Option<String>,
    defines: Vec<String>,
    verbose: bool,
) -> CliResult<()> {
    validate_source_extension(input)?;
    let output_path = output.unwrap_or_else(|| derive_output_path(input));
    let cwd = working_directory(input);

    match assemble(input, cwd, defines) {
        AssemblyResult::Success { output: image, context } => {
            if verbose || context.warning_count() > 0 {
                context.report_all(verbose);
            }
            fs::write(&output_path, &image.image).map_err(|e| CliError::Generic {
                message: format!("failed to write '{}': {}", output_path, e),
                exit_code: exit::Code::CantCreat,
            })?;
            println!(
                "Successfully assembled {} ({} byte(s)) to {}",
                input,
                image.image.len(),
                output_path
            );
            Ok(())
        }
        AssemblyResult::Failed { context } => {
            context.report_all(verbose);
            Err(CliError::Generic {
                message: format!(
                    "{}: could not assemble '{}' due to previous error(s)",
                    "error".red(),
                    input
                ),
                exit_code: exit::Code::Dataerr,
            })
        }
    }
}

/// Run the pipeline through semantic analysis only
///
/// ### Arguments
/// * `input` - The input source file
/// * `defines` - Preprocessor symbols defined up front
pub fn check_file(input: &str, defines: Vec<String>) -> CliResult<()> {
    validate_source_extension(input)?;
    let cwd = working_directory(input);
    let pipeline = AssemblyPipeline::new(input, cwd).with_defines(defines);

    let stage = pipeline
        .preprocess()
        .and_then(|pipeline, text| pipeline.tokenize(text))
        .and_then(|pipeline, tokens| pipeline.parse(tokens))
        .and_then(|pipeline, program| pipeline.analyze(program));

    match stage {
        PipelineStage::Success { pipeline, .. } => {
            if pipeline.diagnostics().warning_count() > 0 {
                pipeline.diagnostics().report_all(false);
            }
            println!("{}: no problems found", input);
            Ok(())
        }
        PipelineStage::Failed { pipeline } => {
            pipeline.diagnostics().report_all(false);
            Err(CliError::Generic {
                message: format!("{}: '{}' did not pass checks", "error".red(), input),
                exit_code: exit::Code::Dataerr,
            })
        }
    }
}

/// Print the include dependency graph
///
/// ### Arguments
/// * `input` - The input source file
/// * `dot` - Whether to render Graphviz DOT instead of a tree
pub fn print_graph(input: &str, dot: bool) -> CliResult<()> {
    validate_source_extension(input)?;
    let reader = FsReader;
    let source = reader.read(Path::new(input)).map_err(|e| CliError::Generic {
        message: format!("could not read '{}': {}", input, e),
        exit_code: exit::Code::NoInput,
    })?;
    let cwd = working_directory(input);

    let graph = DependencyGraph::build(&source, &cwd, Some(Path::new(input)), &reader).map_err(
        |fatal| CliError::Generic {
            message: fatal.to_string(),
            exit_code: exit::Code::Dataerr,
        },
    )?;

    if dot {
        print!("{}", graph.to_dot());
    } else {
        print!("{}", graph.to_tree_string());
    }
    if let Some(cycle) = graph.cycle_path() {
        eprintln!(
            "{}: include cycle detected: {}",
            "warning".yellow(),
            cycle.join(" -> ")
        );
    }
    Ok(())
}

/// Requires the `.kasm` extension on an input path
fn validate_source_extension(input: &str) -> CliResult<()> {
    let extension = Path::new(input).extension().and_then(|e| e.to_str());
    if extension != Some(SOURCE_EXTENSION) {
        return Err(CliError::Generic {
            message: format!(
                "'{}' is not a .{} file; refusing to assemble",
                input, SOURCE_EXTENSION
            ),
            exit_code: exit::Code::Usage,
        });
    }
    Ok(())
}

/// Default output path: the input stem with the image extension
fn derive_output_path(input: &str) -> String {
    let path = Path::new(input);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    format!("{}.{}", stem, IMAGE_EXTENSION)
}

/// Includes resolve against the directory containing the input file
fn working_directory(input: &str) -> PathBuf {
    Path::new(input)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
