//! monorepo_tools - Command line interface for monorepo imports
//!
//! Imports individual repos into a monorepo while keeping their full
//! commit history.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::ImportArgs;

/// Monorepo tools: import individual repos into a monorepo
#[derive(Parser, Debug)]
#[command(name = "monorepo_tools")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import individual repos into a monorepo
    Import(ImportArgs),
}

impl Cli {
    fn silent(&self) -> bool {
        match &self.command {
            Commands::Import(args) => args.silent,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Progress goes to stderr, at INFO level unless silenced.
    let default_level = if cli.silent() { "warn" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match cli.command {
        Commands::Import(args) => args.execute(),
    }
}
