//! Match command - play a best-of-N match between two agents
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: report_results()

use anyhow::Result;
use clap::Args;

use baghchal_core::{Reporter, TracingReporter};
use baghchal_tournament::{
    play_match, result_path, BestOf, GameRunner, MatchRecord, MatchResultFile, TimingStats,
    TranscriptLog,
};

use crate::arena::ArenaArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Experiment name, scoping the saved artifacts
    pub experiment: String,

    /// Number of games (odd)
    pub best_of: u32,

    /// Agent A (Goat in odd-numbered games)
    pub model_a: String,

    /// Agent B
    pub model_b: String,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
pub fn run(args: MatchArgs, arena: &ArenaArgs) -> Result<()> {
    let best_of = BestOf::new(args.best_of)?;
    let paths = arena.paths();
    paths.ensure()?;

    let provider = arena.provider_for(&[args.model_a.clone(), args.model_b.clone()])?;
    let engine = arena.engine()?;
    let reporter = TracingReporter::new(args.experiment.clone());
    let mut runner = GameRunner::new(engine, &provider, &reporter, arena.settings());

    let transcript = TranscriptLog::for_match(&paths, &args.experiment, best_of, &args.model_a, &args.model_b);
    let record = play_match(&mut runner, &args.model_a, &args.model_b, best_of, Some(&transcript));
    tracing::info!("Transcript saved to {}", transcript.path().display());

    let result = MatchResultFile::from_match(&record, &args.experiment);
    let path = result_path(&paths, &args.experiment, &args.model_a, &args.model_b);
    match result.save(&path) {
        Ok(()) => reporter.info(&format!("Match result saved to {}", path.display())),
        Err(e) => reporter.error(&format!("Failed to save match result: {}", e)),
    }

    report_results(&record);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn report_results(record: &MatchRecord) {
    println!();
    println!("{} vs {} ({})", record.agent_a, record.agent_b, record.best_of);
    println!(
        "Wins: {} {} - {} {}   draws {}   aborted {}",
        record.agent_a, record.wins_a(), record.wins_b(), record.agent_b, record.draws, record.aborted
    );
    match record.winner() {
        Some(winner) => println!("Winner: {} (score {:.1})", winner, record.score_a()),
        None => println!("Match tied (score 0.5)"),
    }

    let durations = record.durations();
    for (agent, samples) in &durations {
        let stats = TimingStats::from_samples(samples);
        println!(
            "{}: mean {:.2}s, median {:.2}s, std {:.2}s over {} moves",
            agent, stats.mean, stats.median, stats.std_dev, stats.samples
        );
    }
}
