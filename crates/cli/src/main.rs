use std::process::ExitCode;

use clap::Parser;

mod commands;
mod printer;

use commands::Command;
use pdfshelf_runtime::logging;

#[derive(Debug, Parser)]
#[command(
    name = "pdfshelf",
    version,
    about = "Find, sort, rename and delete the PDFs on shared storage",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::List(args) => commands::list::run(args),
        Command::Info(args) => commands::info::run(args),
        Command::Rename(args) => commands::rename::run(args),
        Command::Delete(args) => commands::delete::run(args),
        Command::Browse(args) => commands::browse::run(args),
        Command::Index(args) => commands::index::run(args),
    }
}
