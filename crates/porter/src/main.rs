//! Porter CLI - essay to post converter.
//!
//! Provides commands for:
//! - `convert`: Convert an essay tree into dated posts
//! - `preview`: Convert a single essay and print the result

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, PreviewArgs};
use output::Output;

/// Porter - essay to post converter.
#[derive(Parser)]
#[command(name = "porter", version, about)]
struct Cli {
    /// Enable verbose output (per-document logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every essay under the source directory.
    Convert(ConvertArgs),
    /// Convert one essay file and print it to stdout.
    Preview(PreviewArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::Preview(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
