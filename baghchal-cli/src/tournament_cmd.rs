//! Tournament command - round-robin run, offline analysis, or command generation

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use baghchal_core::TracingReporter;
use baghchal_tournament::{
    analyze_tournament, build_roster, generate_commands, generate_round_robin_pairings,
    run_tournament, ArenaPaths, BestOf, GameRunner, TournamentConfig, TournamentReport,
};

use crate::arena::ArenaArgs;

#[derive(Args)]
pub struct TournamentArgs {
    /// Experiment name, scoping the saved artifacts
    pub experiment: String,

    /// Games per match (odd)
    #[arg(default_value = "3")]
    pub best_of: u32,

    /// Roster, in pairing order
    #[arg(long, num_args = 1.., required = true)]
    pub models: Vec<String>,

    /// Rebuild the results from saved match results instead of playing
    #[arg(long)]
    pub analyze: bool,

    /// Write one `baghchal match` command per pairing to FILE instead of playing
    #[arg(long, value_name = "FILE", conflicts_with = "analyze")]
    pub generate_commands: Option<PathBuf>,

    /// Skip the heat map
    #[arg(long)]
    pub no_heatmap: bool,
}

impl TournamentArgs {
    /// Whether this invocation keeps a run log under the tournament logs
    pub fn writes_run_log(&self) -> bool {
        self.generate_commands.is_none()
    }
}

/// `<tournament_logs>/<YYYY_MM_DD>_<experiment>_bestof<N>.log`
pub fn run_log_path(paths: &ArenaPaths, args: &TournamentArgs) -> PathBuf {
    paths.tournament_logs().join(format!(
        "{}_{}_bestof{}.log",
        Local::now().format("%Y_%m_%d"),
        args.experiment,
        args.best_of
    ))
}

pub fn run(args: TournamentArgs, arena: &ArenaArgs) -> Result<()> {
    let best_of = BestOf::new(args.best_of)?;
    let mut config = TournamentConfig::new(&args.experiment, best_of);
    if args.no_heatmap {
        config = config.without_heatmap();
    }

    let paths = arena.paths();
    let reporter = TracingReporter::new(args.experiment.clone());
    let roster = build_roster(&args.models, &reporter);
    if roster.len() < 2 {
        anyhow::bail!("A tournament needs at least two distinct models");
    }

    if let Some(path) = &args.generate_commands {
        let count = generate_commands(&roster, &config, path)
            .with_context(|| format!("Failed to write commands to {}", path.display()))?;
        println!("Wrote {} match commands to {}", count, path.display());
        return Ok(());
    }

    paths.ensure()?;
    let report = if args.analyze {
        analyze_tournament(&roster, &config, &paths, &reporter)?
    } else {
        play(&roster, &config, &paths, arena, &reporter)?
    };

    print_report(&report);
    Ok(())
}

fn play(
    roster: &[String],
    config: &TournamentConfig,
    paths: &ArenaPaths,
    arena: &ArenaArgs,
    reporter: &TracingReporter,
) -> Result<TournamentReport> {
    let provider = arena.provider_for(roster)?;
    let engine = arena.engine()?;
    let mut runner = GameRunner::new(engine, &provider, reporter, arena.settings());

    let pb = create_progress_bar(generate_round_robin_pairings(roster.len()).len());
    let report = run_tournament(&mut runner, roster, config, paths, |record| {
        pb.set_message(format!(
            "{} vs {}: {:.1}",
            record.agent_a,
            record.agent_b,
            record.score_a()
        ));
        pb.inc(1);
    });
    pb.finish_with_message("done");
    Ok(report)
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} matches ({msg})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(250));
    pb
}

fn print_report(report: &TournamentReport) {
    println!();
    print!("{}", report.render());
    if let Some(winner) = report.winner() {
        println!("\nWinner: {} ({:.1} points)", winner.name, winner.score);
    }
}
