//! schemabridge CLI - Translation layer generator
//!
//! Commands:
//! - `schemabridge generate` - Generate conversions and the API wrapper for an annotated file
//! - `schemabridge describe` - Print the extracted translation layer as JSON
//! - `schemabridge annotations` - List the directives found in a file
//! - `schemabridge check` - Validate a schemabridge.toml settings file

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod generate;

#[derive(Parser)]
#[command(name = "schemabridge")]
#[command(author, version, about = "Generates translation layers between two record schemas", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the translation layer for an annotated source file
    Generate {
        /// Annotated Rust source file
        #[arg(short, long)]
        source: PathBuf,

        /// Output file (default: generated.rs next to the source)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to schemabridge.toml (default: nearest one above the source)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the translation layer extracted from a source file as JSON
    Describe {
        /// Annotated Rust source file
        #[arg(short, long)]
        source: PathBuf,

        /// Path to schemabridge.toml (default: nearest one above the source)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the directives in a source file
    Annotations {
        /// Annotated Rust source file
        #[arg(short, long)]
        source: PathBuf,

        /// Path to schemabridge.toml (default: nearest one above the source)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate a schemabridge.toml settings file
    Check {
        /// Path to schemabridge.toml (default: ./schemabridge.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            source,
            output,
            config,
        } => {
            generate::run(&source, output, config)?;
        }
        Commands::Describe { source, config } => {
            generate::describe(&source, config)?;
        }
        Commands::Annotations { source, config } => {
            generate::annotations(&source, config)?;
        }
        Commands::Check { config } => {
            generate::check(config)?;
        }
    }

    Ok(())
}
