//! PaperCrypt CLI - encrypted documents for printing on paper
//!
//! This is the command-line interface for PaperCrypt. It wires the core codec
//! to files, prompts and exit codes.

mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::{decode, generate, misc, qr};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        if let Some(hint) = errors::hint_for(&e) {
            eprintln!("{}", hint);
        }
        std::process::exit(errors::exit_code_for(&e));
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Generate(args) => generate::handle_generate(cli, args),
        Commands::Qr(args) => qr::handle_qr(cli, args),
        Commands::Decode(args) => decode::handle_decode(cli, args),
        Commands::Completions(args) => misc::handle_completions(args.shell),
    }
}
