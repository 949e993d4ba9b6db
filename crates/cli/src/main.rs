//! Sattva CLI
//!
//! Main entry point for the sattva command-line tool: retrieval-
//! augmented answering over a fixed wellness corpus, with a safety
//! gate in front of every query.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, CheckCommand, StatsCommand};
use sattva_core::{config::AppConfig, config::RetrievalStrategy, logging, AppError, AppResult};
use std::path::PathBuf;

/// Sattva CLI - grounded wellness Q&A with provider fallback
#[derive(Parser, Debug)]
#[command(name = "sattva")]
#[command(about = "Grounded wellness Q&A with provider fallback", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the corpus file (JSON array of articles)
    #[arg(long, global = true, env = "SATTVA_CORPUS")]
    corpus: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "SATTVA_CONFIG")]
    config: Option<PathBuf>,

    /// Retrieval strategy (lexical, expanded, embedded)
    #[arg(short, long, global = true, env = "SATTVA_STRATEGY")]
    strategy: Option<String>,

    /// Number of documents to retrieve per query
    #[arg(short = 'k', long, global = true)]
    top_k: Option<usize>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question against the corpus
    Ask(AskCommand),

    /// Run only the safety gate on a query
    Check(CheckCommand),

    /// Show corpus and configuration statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let strategy = match cli.strategy.as_deref() {
        Some(s) => Some(
            RetrievalStrategy::parse(s)
                .ok_or_else(|| AppError::Config(format!("Unknown strategy: {}", s)))?,
        ),
        None => None,
    };

    // Load base configuration, then apply CLI overrides
    let config = AppConfig::load()?.with_overrides(
        cli.corpus,
        cli.config,
        strategy,
        cli.top_k,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Sattva CLI starting");
    tracing::debug!("Corpus: {:?}", config.corpus);
    tracing::debug!("Strategy: {}", config.retrieval.strategy.as_str());

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Check(_) => "check",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Check(cmd) => cmd.execute(),
        Commands::Stats(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
