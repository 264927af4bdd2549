//! Canopy CLI - Transaction categorization in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{demo, import, rules, run, status};

/// Canopy - categorize your transactions with rules
#[derive(Parser)]
#[command(name = "canopy", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show data set status and summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage categorization rules
    Rules {
        #[command(subcommand)]
        command: rules::RuleCommands,
    },

    /// Run rules over all transactions
    Run {
        /// Act on another user's data (administrative re-sync with
        /// per-item results)
        #[arg(long)]
        user: Option<uuid::Uuid>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import transactions from CSV
    Import {
        /// Path to CSV file
        file: PathBuf,
        /// Institution the file belongs to
        #[arg(long)]
        institution: String,
        /// Flip signs on all amounts (for spend-positive exports)
        #[arg(long)]
        flip_signs: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Seed demo data to try the engine out
    Demo {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status { json } => status::run(json).await,
        Commands::Rules { command } => rules::run(command).await,
        Commands::Run { user, json } => run::run(user, json).await,
        Commands::Import {
            file,
            institution,
            flip_signs,
            json,
        } => import::run(&file, &institution, flip_signs, json).await,
        Commands::Demo { json } => demo::run(json).await,
    }
}
