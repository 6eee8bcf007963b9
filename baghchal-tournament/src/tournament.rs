//! Tournament execution - round-robin run, offline analysis, command generation
//!
//! Level 1 - Orchestration and Level 2 - Phases

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use baghchal_core::{Reporter, RuleEngine};

use crate::config::{ArenaPaths, TournamentConfig};
use crate::error::{ArenaError, Result};
use crate::game_runner::GameRunner;
use crate::heatmap;
use crate::match_play::{play_match, MatchRecord};
use crate::results::{result_path, MatchResultFile};
use crate::stats::TimingStats;
use crate::transcript::TranscriptLog;

/// Pairwise match scores; `cell(i, j)` is agent i's score against agent j
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreMatrix {
    agents: Vec<String>,
    cells: Vec<Vec<Option<f64>>>,
}

impl ScoreMatrix {
    pub fn new(agents: &[String]) -> Self {
        let n = agents.len();
        Self {
            agents: agents.to_vec(),
            cells: vec![vec![None; n]; n],
        }
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn index(&self, agent: &str) -> Option<usize> {
        self.agents.iter().position(|a| a == agent)
    }

    /// Record A's match score against B and the complement for B.
    ///
    /// Returns false (and records nothing) if either agent is unknown or they are the same.
    pub fn record(&mut self, agent_a: &str, agent_b: &str, score_a: f64) -> bool {
        match (self.index(agent_a), self.index(agent_b)) {
            (Some(i), Some(j)) if i != j => {
                self.cells[i][j] = Some(score_a);
                self.cells[j][i] = Some(1.0 - score_a);
                true
            }
            _ => false,
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Score of `agent` against `opponent`, if they met
    pub fn get(&self, agent: &str, opponent: &str) -> Option<f64> {
        self.cell(self.index(agent)?, self.index(opponent)?)
    }

    /// Sum of an agent's match scores
    pub fn total(&self, agent: &str) -> f64 {
        self.index(agent)
            .map(|i| self.cells[i].iter().flatten().sum())
            .unwrap_or(0.0)
    }

    /// Matches an agent has a recorded score for
    pub fn played(&self, agent: &str) -> u32 {
        self.index(agent)
            .map(|i| self.cells[i].iter().flatten().count() as u32)
            .unwrap_or(0)
    }
}

/// Standing of a participant in the tournament
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Standing {
    pub name: String,
    /// Sum of match scores
    pub score: f64,
    pub matches: u32,
}

impl Standing {
    /// Score per match (0.0 to 1.0)
    pub fn normalized_score(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.score / self.matches as f64
        }
    }
}

/// Result of a tournament, from a live run or from persisted match results
#[derive(Clone, Debug)]
pub struct TournamentReport {
    pub experiment: String,
    pub matrix: ScoreMatrix,
    /// Per-move durations of every match, merged per agent
    pub durations: BTreeMap<String, Vec<f64>>,
    /// Matches that contributed to the matrix
    pub matches: usize,
}

impl TournamentReport {
    fn new(experiment: &str, roster: &[String]) -> Self {
        Self {
            experiment: experiment.to_string(),
            matrix: ScoreMatrix::new(roster),
            durations: roster.iter().map(|a| (a.clone(), Vec::new())).collect(),
            matches: 0,
        }
    }

    fn absorb(&mut self, agent_a: &str, agent_b: &str, score_a: f64, durations: &BTreeMap<String, Vec<f64>>) {
        if !self.matrix.record(agent_a, agent_b, score_a) {
            return;
        }
        for (agent, samples) in durations {
            if let Some(merged) = self.durations.get_mut(agent) {
                merged.extend_from_slice(samples);
            }
        }
        self.matches += 1;
    }

    /// Timing statistics per roster agent
    pub fn timing(&self) -> BTreeMap<String, TimingStats> {
        self.durations
            .iter()
            .map(|(agent, samples)| (agent.clone(), TimingStats::from_samples(samples)))
            .collect()
    }

    /// Standings sorted by total score (descending), then name
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .matrix
            .agents()
            .iter()
            .map(|name| Standing {
                name: name.clone(),
                score: self.matrix.total(name),
                matches: self.matrix.played(name),
            })
            .collect();

        standings.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        standings
    }

    /// Get winner (top standing)
    pub fn winner(&self) -> Option<Standing> {
        self.standings().into_iter().next()
    }

    /// Plain-text summary: matrix, standings, timing
    pub fn render(&self) -> String {
        let mut out = String::new();
        let agents = self.matrix.agents();
        let width = agents.iter().map(String::len).max().unwrap_or(0).max(5);

        let _ = writeln!(out, "Tournament '{}' ({} matches)", self.experiment, self.matches);
        let _ = writeln!(out, "\nScore matrix (row vs column):");
        let _ = write!(out, "{:>w$}   ", "", w = width + 4);
        for j in 0..agents.len() {
            let _ = write!(out, "{:>5}", j + 1);
        }
        out.push('\n');
        for (i, agent) in agents.iter().enumerate() {
            let _ = write!(out, "{:>2}. {:<w$}   ", i + 1, agent, w = width);
            for j in 0..agents.len() {
                match self.matrix.cell(i, j) {
                    Some(score) => {
                        let _ = write!(out, "{:>5.1}", score);
                    }
                    None => out.push_str("    -"),
                }
            }
            out.push('\n');
        }

        let _ = writeln!(out, "\nStandings:");
        for (rank, standing) in self.standings().iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>2}. {:<w$}  {:>4.1} / {}  ({:.3})",
                rank + 1,
                standing.name,
                standing.score,
                standing.matches,
                standing.normalized_score(),
                w = width
            );
        }

        let _ = writeln!(out, "\nMove timing (seconds):");
        for (agent, stats) in self.timing() {
            let _ = writeln!(
                out,
                "{:<w$}  mean {:>7.3}  median {:>7.3}  std {:>7.3}  n={}",
                agent,
                stats.mean,
                stats.median,
                stats.std_dev,
                stats.samples,
                w = width + 4
            );
        }
        out
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Run a full round-robin (Level 1 orchestration)
///
/// Every unordered pair in roster order plays one match. Match results and
/// transcripts are persisted as they finish; persistence failures are reported.
/// `on_match` is called after each match, for progress display.
pub fn run_tournament<E: RuleEngine>(
    runner: &mut GameRunner<'_, E>,
    roster: &[String],
    config: &TournamentConfig,
    paths: &ArenaPaths,
    mut on_match: impl FnMut(&MatchRecord),
) -> TournamentReport {
    let reporter = runner.reporter();
    let mut report = TournamentReport::new(&config.experiment, roster);
    let pairings = generate_round_robin_pairings(roster.len());

    reporter.info(&format!(
        "Starting tournament '{}' with {} models, {} matches ({})",
        config.experiment,
        roster.len(),
        pairings.len(),
        config.best_of
    ));

    for (i, j) in pairings {
        let record = execute_match(runner, &roster[i], &roster[j], config, paths);
        report.absorb(&record.agent_a, &record.agent_b, record.score_a(), &record.durations());
        on_match(&record);
    }

    finish(&report, config, paths, reporter);
    report
}

/// Rebuild a tournament from persisted match results (Level 1 orchestration)
///
/// Only results of `config.experiment` between two roster agents count.
/// Unreadable files are reported and skipped.
pub fn analyze_tournament(
    roster: &[String],
    config: &TournamentConfig,
    paths: &ArenaPaths,
    reporter: &dyn Reporter,
) -> Result<TournamentReport> {
    let mut report = TournamentReport::new(&config.experiment, roster);
    let pattern = format!(
        "{}/{}_*.json",
        paths.match_results().display(),
        glob::Pattern::escape(&config.experiment)
    );
    let entries = glob::glob(&pattern)
        .map_err(|e| ArenaError::Config(format!("bad result pattern {}: {}", pattern, e)))?;

    let mut found = 0;
    for path in entries.flatten() {
        let result = match MatchResultFile::load(&path) {
            Ok(result) => result,
            Err(e) => {
                reporter.warn(&format!("Skipping {}: {}", path.display(), e));
                continue;
            }
        };
        found += 1;

        if result.experiment.as_deref().is_some_and(|e| e != config.experiment) {
            continue;
        }
        report.absorb(&result.model_a, &result.model_b, result.score_a, &result.durations);
    }

    reporter.info(&format!(
        "Analyzed {} result files, {} matches between roster models",
        found, report.matches
    ));
    finish(&report, config, paths, reporter);
    Ok(report)
}

/// Write one `baghchal match` command per pairing, for running matches as separate processes
pub fn generate_commands(roster: &[String], config: &TournamentConfig, path: &Path) -> Result<usize> {
    let pairings = generate_round_robin_pairings(roster.len());
    let mut script = String::new();
    for &(i, j) in &pairings {
        let _ = writeln!(
            script,
            "baghchal match {} {} \"{}\" \"{}\"",
            config.experiment,
            config.best_of.games(),
            roster[i],
            roster[j]
        );
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .map_err(|e| ArenaError::io(format!("creating {}", dir.display()), e))?;
    }
    std::fs::write(path, script).map_err(|e| ArenaError::io(format!("writing {}", path.display()), e))?;
    Ok(pairings.len())
}

/// Roster in first-seen order with duplicates removed
pub fn build_roster(models: &[String], reporter: &dyn Reporter) -> Vec<String> {
    let mut roster: Vec<String> = Vec::with_capacity(models.len());
    for model in models {
        if roster.contains(model) {
            reporter.warn(&format!("Ignoring duplicate model {}", model));
        } else {
            roster.push(model.clone());
        }
    }
    roster
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Play and persist a single match (Level 2 phase)
fn execute_match<E: RuleEngine>(
    runner: &mut GameRunner<'_, E>,
    agent_a: &str,
    agent_b: &str,
    config: &TournamentConfig,
    paths: &ArenaPaths,
) -> MatchRecord {
    let reporter = runner.reporter();
    let transcript = TranscriptLog::for_match(paths, &config.experiment, config.best_of, agent_a, agent_b);
    let record = play_match(runner, agent_a, agent_b, config.best_of, Some(&transcript));

    let result = MatchResultFile::from_match(&record, &config.experiment);
    let path = result_path(paths, &config.experiment, agent_a, agent_b);
    match result.save(&path) {
        Ok(()) => reporter.info(&format!("Saved match result to {}", path.display())),
        Err(e) => reporter.error(&format!("Failed to save match result: {}", e)),
    }
    record
}

/// Summary logging and the best-effort heat map (Level 2 phase)
fn finish(report: &TournamentReport, config: &TournamentConfig, paths: &ArenaPaths, reporter: &dyn Reporter) {
    for line in report.render().lines() {
        reporter.info(line);
    }

    if config.heatmap {
        let path = heatmap::heatmap_path(paths, &config.experiment);
        match heatmap::write_heatmap(&report.matrix, &config.experiment, &path) {
            Ok(()) => reporter.info(&format!("Saved heat map to {}", path.display())),
            Err(e) => reporter.warn(&format!("Heat map not written: {}", e)),
        }
    }
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Generate all pairings for round-robin, in roster order
pub fn generate_round_robin_pairings(n: usize) -> Vec<(usize, usize)> {
    let mut pairings = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            pairings.push((i, j));
        }
    }
    pairings
}
