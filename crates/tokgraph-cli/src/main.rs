//! tokgraph CLI - tokenomics preview analysis
//!
//! Turns raw `preview_tokenomics_graphs` responses into epoch tables, metrics and findings.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// tokgraph: validate tokenomics preview responses
///
/// Extracts the engine's vector fields, aligns them into per-epoch records and
/// derives summary metrics for each test case.
#[derive(Parser)]
#[command(name = "tokgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (JSON)
    #[arg(short, long, global = true, env = "TOKGRAPH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in scenario catalog
    Scenarios {
        /// Output format (json, human)
        #[arg(short, long, default_value = "human")]
        format: String,
    },

    /// Analyze a raw response batch
    Analyze {
        /// Raw batch file (`test_id|response` per line)
        #[arg(short, long)]
        responses: PathBuf,

        /// Parameter sets (JSON array); defaults to the scenario catalog
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// Output format (json, human, report)
        #[arg(short, long, default_value = "human")]
        format: String,

        /// Include per-epoch records in the output
        #[arg(long)]
        epochs: bool,
    },

    /// Print the Candid preview argument for a scenario
    PreviewArgs {
        /// Scenario id (e.g. A1, B9, D4)
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config)?;

    // Initialize logging
    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    if config.logging.json_output {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Scenarios { format } => commands::scenarios::run(format),
        Commands::Analyze {
            responses,
            params,
            format,
            epochs,
        } => commands::analyze::run(responses, params, format, epochs, config),
        Commands::PreviewArgs { id } => commands::preview_args::run(id),
    }
}
