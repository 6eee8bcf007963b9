//! Elo command - rebuild ratings from every saved transcript

use anyhow::Result;

use baghchal_core::TracingReporter;
use baghchal_tournament::{persist, replay_transcripts};

use crate::arena::ArenaArgs;

pub fn run(arena: &ArenaArgs) -> Result<()> {
    let paths = arena.paths();
    let reporter = TracingReporter::new("elo");

    let (store, stats) = replay_transcripts(&paths.game_logs(), &reporter)?;
    if store.is_empty() {
        println!("No rated games found in {}", paths.game_logs().display());
        return Ok(());
    }

    let written = persist(&store, &paths.elos(), &reporter);
    tracing::info!("Wrote {} ratings to {}", written, paths.elos().display());

    println!("{:<4} {:<50} {:>8}", "#", "Model", "ELO");
    for (rank, (agent, rating)) in store.ranked().iter().enumerate() {
        println!("{:<4} {:<50} {:>8.2}", rank + 1, agent, rating);
    }
    println!("\n{} games from {} transcripts ({} skipped)", stats.applied, stats.files, stats.skipped);
    Ok(())
}
