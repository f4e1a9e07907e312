//! Gedtrim CLI - Command line interface for GEDCOM filtering

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{completions, filter, find, info};

#[derive(Parser)]
#[command(name = "gedtrim")]
#[command(
    author,
    version,
    about = "Trim a GEDCOM family tree to the people related to one person"
)]
pub struct Cli {
    /// Output format: text, json
    #[arg(short, long, default_value = "text", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter a GEDCOM file around a starting individual
    Filter(filter::FilterArgs),
    /// Find individuals by name
    Find(find::FindArgs),
    /// Show summary information about a GEDCOM file
    Info(info::InfoArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting gedtrim CLI");

    match &cli.command {
        Commands::Filter(args) => filter::run(args, &cli)?,
        Commands::Find(args) => find::run(args, &cli)?,
        Commands::Info(args) => info::run(args, &cli)?,
        Commands::Completions(args) => completions::run(args)?,
    }

    Ok(())
}
