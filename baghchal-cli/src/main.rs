//! Bagh-Chal Arena CLI - Command-line interface
//!
//! Commands:
//! - play: Play a single game between two agents
//! - match: Play a best-of-N match and save its artifacts
//! - tournament: Round-robin over a roster, or analyze saved results
//! - elo: Rebuild ratings from game transcripts
//! - models: List OpenRouter models and prices

mod arena;
mod elo_cmd;
mod match_cmd;
mod models_cmd;
mod play_cmd;
mod tournament_cmd;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use arena::ArenaArgs;

#[derive(Parser)]
#[command(name = "baghchal")]
#[command(about = "Bagh-Chal arena for LLM agents")]
struct Cli {
    #[command(flatten)]
    arena: ArenaArgs,

    /// Log at debug level (positions, raw replies)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game
    Play(play_cmd::PlayArgs),
    /// Play a best-of-N match
    Match(match_cmd::MatchArgs),
    /// Run or analyze a round-robin tournament
    Tournament(tournament_cmd::TournamentArgs),
    /// Recalculate Elo ratings from game transcripts
    Elo,
    /// List available models
    Models(models_cmd::ModelsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Tournament(args) if args.writes_run_log() => {
            Some(tournament_cmd::run_log_path(&cli.arena.paths(), args))
        }
        _ => None,
    };
    init_tracing(cli.debug, log_file.as_deref())?;

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, &cli.arena),
        Commands::Match(args) => match_cmd::run(args, &cli.arena),
        Commands::Tournament(args) => tournament_cmd::run(args, &cli.arena),
        Commands::Elo => elo_cmd::run(&cli.arena),
        Commands::Models(args) => models_cmd::run(args, &cli.arena),
    }
}

/// Console logging, plus a plain-text copy in `log_file` when given
fn init_tracing(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")
}
