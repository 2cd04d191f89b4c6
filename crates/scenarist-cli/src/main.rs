//! Feature document tooling for the `scenarist` binary.
//!
//! Running scenarios requires step definitions, which live in the embedding
//! project (see [`scenarist_cli::run_with_registry`]). The binary covers the
//! registry-free workflows: validating documents and listing scenarios.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Tooling for plain-text feature documents.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse documents and report diagnostics without running them.
    Check {
        /// Feature files or directories to check.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List the scenarios found under the given paths.
    List {
        /// Feature files or directories to list.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    match Cli::parse().command {
        Commands::Check { paths } => scenarist_cli::check_paths(&paths),
        Commands::List { paths } => scenarist_cli::list_paths(&paths),
    }
}
