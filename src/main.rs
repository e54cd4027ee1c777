mod cli;
mod error;
mod exit;
mod init;

use clap::Parser as ClapParser;
use cli::{Cli, Commands};

fn main() {
    init::init_tracing();
    let arguments = Cli::parse();

    let result = match arguments.command {
        Some(Commands::Assemble {
            input,
            output,
            defines,
            verbose,
        }) => cli::assemble_file(&input, output, defines, verbose),
        Some(Commands::Check { input, defines }) => cli::check_file(&input, defines),
        Some(Commands::Graph { input, dot }) => cli::print_graph(&input, dot),
        None => Ok(()),
    };

    if let Err(error) = result {
        error.exit_code().exit(error.message());
    }
}
