mod cli;
mod commands;
mod manifest;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

fn main() {
    if let Err(e) = run() {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing_with_level(&cli.log_level);

    match &cli.command {
        Commands::Check(args) => commands::check::check(&args.manifest)?,
        Commands::Print(args) => commands::print::print(&args.manifest, args.no_merge_roots)?,
    }

    Ok(())
}
