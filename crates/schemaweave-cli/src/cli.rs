use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "schemaweave")]
#[command(about = "schemaweave CLI: assemble GraphQL schemas from SDL units")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level filter (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "SCHEMAWEAVE_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble and compile the units of a manifest
    Check(CheckArgs),
    /// Print the assembled SDL document
    Print(PrintArgs),
}

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Path to the manifest (TOML)
    pub manifest: PathBuf,
}

#[derive(clap::Args)]
pub struct PrintArgs {
    /// Path to the manifest (TOML)
    pub manifest: PathBuf,
    /// Emit additional root declarations as `extend type` instead of merging them
    #[arg(long)]
    pub no_merge_roots: bool,
}
