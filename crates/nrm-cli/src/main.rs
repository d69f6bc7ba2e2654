//! NRM CLI - Command-line driver for seeded experiment runs.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "nrm")]
#[command(author, version, about = "NRM - Composition-decomposition population runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new NRM project
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Run a single experiment
    Run {
        /// Number of cycles (overrides nrm.toml)
        #[arg(short, long)]
        cycles: Option<u64>,

        /// Random seed (overrides nrm.toml)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write every swarm event to <run_id>.events.jsonl
        #[arg(short, long)]
        events: bool,

        /// Append every swarm event to a SQLite database
        #[cfg(feature = "sqlite")]
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Run one experiment per seed
    Sweep {
        /// Comma-separated seeds (e.g., "1,2,3")
        #[arg(short, long, value_delimiter = ',', required = true)]
        seeds: Vec<u64>,

        /// Number of cycles (overrides nrm.toml)
        #[arg(short, long)]
        cycles: Option<u64>,
    },

    /// Re-label recorded runs under the [basin] thresholds of nrm.toml
    Classify {
        /// Run summary files
        #[arg(required = true)]
        summaries: Vec<PathBuf>,

        /// Write the new label and thresholds back into each file
        #[arg(short, long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run {
            cycles,
            seed,
            events,
            #[cfg(feature = "sqlite")]
            db,
        } => {
            let sinks = commands::run::Sinks {
                events,
                #[cfg(feature = "sqlite")]
                db,
            };
            commands::run::run(cycles, seed, sinks, cli.verbose)
        }
        Commands::Sweep { seeds, cycles } => commands::sweep::run(&seeds, cycles),
        Commands::Classify { summaries, write } => commands::classify::run(&summaries, write),
    }
}
