//! Play command - a single game between two agents

use anyhow::Result;
use clap::Args;

use baghchal_core::TracingReporter;
use baghchal_tournament::{BestOf, GameRunner, TranscriptLog};

use crate::arena::ArenaArgs;

#[derive(Args)]
pub struct PlayArgs {
    /// Agent playing Goat (moves first)
    pub goat: String,

    /// Agent playing Tiger
    pub tiger: String,

    /// Append the game to a transcript under the game logs
    #[arg(long)]
    pub save: bool,
}

pub fn run(args: PlayArgs, arena: &ArenaArgs) -> Result<()> {
    let provider = arena.provider_for(&[args.goat.clone(), args.tiger.clone()])?;
    let engine = arena.engine()?;
    let reporter = TracingReporter::new("play");

    let mut runner = GameRunner::new(engine, &provider, &reporter, arena.settings());
    let record = runner.play_game(&args.goat, &args.tiger);

    if args.save {
        let log = TranscriptLog::for_match(&arena.paths(), "play", BestOf::new(1)?, &args.goat, &args.tiger);
        log.append(&record, 1)?;
        tracing::info!("Saved transcript to {}", log.path().display());
    }

    println!("Result: {} ({})", record.result_code(), record.termination);
    println!("Winner: {}", record.winner_label());
    println!("Moves: {}", record.move_count);
    println!("{}", record.transcript);
    for agent in [&record.goat, &record.tiger] {
        println!("{} thinking time: {:.2}s", agent, record.total_time(agent));
    }
    Ok(())
}
