//! Elo ratings replayed from game transcripts
//!
//! Level 2 - Phase-level implementation

use std::path::Path;

use rustc_hash::FxHashMap;

use baghchal_core::{Reporter, ResultCode};

use crate::config::sanitize_name;
use crate::error::{ArenaError, Result};
use crate::transcript::{discover_transcripts, parse_games, GameSummary};

/// Update factor per game
pub const K_FACTOR: f64 = 32.0;

/// Rating of an agent with no games
pub const DEFAULT_RATING: f64 = 1200.0;

/// Expected score of A against B
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
}

/// New ratings after one game in which A scored `score_a` (1.0, 0.5 or 0.0)
pub fn update_ratings(rating_a: f64, rating_b: f64, score_a: f64) -> (f64, f64) {
    let expected_a = expected_score(rating_a, rating_b);
    let new_a = rating_a + K_FACTOR * (score_a - expected_a);
    let new_b = rating_b + K_FACTOR * ((1.0 - score_a) - (1.0 - expected_a));
    (new_a, new_b)
}

/// Current rating per agent
#[derive(Clone, Debug, Default)]
pub struct RatingStore {
    ratings: FxHashMap<String, f64>,
}

impl RatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rating(&self, agent: &str) -> f64 {
        self.ratings.get(agent).copied().unwrap_or(DEFAULT_RATING)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Apply one decided or drawn game.
    ///
    /// Returns false, changing nothing, for an unknown (`*`) result or a game
    /// an agent played against itself.
    pub fn record_game(&mut self, goat: &str, tiger: &str, result: ResultCode) -> bool {
        if goat == tiger {
            return false;
        }
        let Some(score) = result.goat_score() else {
            return false;
        };
        let (goat_rating, tiger_rating) =
            update_ratings(self.rating(goat), self.rating(tiger), score);
        self.ratings.insert(goat.to_string(), goat_rating);
        self.ratings.insert(tiger.to_string(), tiger_rating);
        true
    }

    /// Agents sorted by rating, highest first
    pub fn ranked(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> =
            self.ratings.iter().map(|(a, r)| (a.clone(), *r)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

/// Counters from one replay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub files: usize,
    pub applied: usize,
    pub skipped: usize,
}

/// Replay game summaries in order
pub fn replay(
    store: &mut RatingStore,
    games: impl IntoIterator<Item = GameSummary>,
    reporter: &dyn Reporter,
) -> ReplayStats {
    let mut stats = ReplayStats::default();
    for game in games {
        if game.goat == game.tiger {
            stats.skipped += 1;
            reporter.warn(&format!(
                "Skipping game {} vs itself: side ratings are ambiguous",
                game.goat
            ));
            continue;
        }
        if store.record_game(&game.goat, &game.tiger, game.result) {
            stats.applied += 1;
        } else {
            stats.skipped += 1;
            reporter.warn(&format!(
                "Skipping game {} vs {}: no result ({})",
                game.goat, game.tiger, game.result
            ));
        }
    }
    stats
}

/// Rebuild ratings from every transcript under `game_logs`, oldest file first
pub fn replay_transcripts(game_logs: &Path, reporter: &dyn Reporter) -> Result<(RatingStore, ReplayStats)> {
    let mut store = RatingStore::new();
    let mut stats = ReplayStats::default();

    for path in discover_transcripts(game_logs, reporter)? {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                reporter.warn(&format!("Skipping {}: {}", path.display(), e));
                continue;
            }
        };
        stats.files += 1;

        let mut games = Vec::new();
        for parsed in parse_games(&text) {
            match parsed {
                Ok(game) => games.push(game),
                Err(e) => {
                    stats.skipped += 1;
                    reporter.warn(&format!("Skipping game in {}: {}", path.display(), e));
                }
            }
        }

        let file_stats = replay(&mut store, games, reporter);
        stats.applied += file_stats.applied;
        stats.skipped += file_stats.skipped;
    }

    reporter.info(&format!(
        "Processed {} games from {} transcripts ({} skipped)",
        stats.applied, stats.files, stats.skipped
    ));
    Ok((store, stats))
}

/// Write `<agent>.txt` per agent and `summary.csv`, overwriting.
///
/// Write failures are reported and skipped; the ratings in `store` stay valid
/// either way. Returns the number of agent files written.
pub fn persist(store: &RatingStore, elos: &Path, reporter: &dyn Reporter) -> usize {
    if let Err(e) = std::fs::create_dir_all(elos) {
        reporter.error(&format!("Failed to create {}: {}", elos.display(), e));
        return 0;
    }

    let ranked = store.ranked();
    let mut written = 0;
    for (agent, rating) in &ranked {
        let path = elos.join(format!("{}.txt", sanitize_name(agent)));
        match std::fs::write(&path, format!("{:.2}", rating)) {
            Ok(()) => written += 1,
            Err(e) => reporter.error(&format!("Failed to write rating for {}: {}", agent, e)),
        }
    }

    let summary = elos.join("summary.csv");
    if let Err(e) = write_summary(&ranked, &summary) {
        reporter.error(&format!("Failed to write rating summary: {}", e));
    }
    written
}

fn write_summary(ranked: &[(String, f64)], path: &Path) -> Result<()> {
    let context = || path.display().to_string();
    let mut wtr = csv::Writer::from_path(path).map_err(|e| ArenaError::csv(context(), e))?;
    wtr.write_record(["Model", "ELO"])
        .map_err(|e| ArenaError::csv(context(), e))?;
    for (agent, rating) in ranked {
        let rating = format!("{:.2}", rating);
        wtr.write_record([agent.as_str(), rating.as_str()])
            .map_err(|e| ArenaError::csv(context(), e))?;
    }
    wtr.flush().map_err(|e| ArenaError::io(format!("writing {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use baghchal_core::{Level, MemoryReporter};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    fn summary(goat: &str, tiger: &str, result: ResultCode) -> GameSummary {
        GameSummary {
            goat: goat.to_string(),
            tiger: tiger.to_string(),
            result,
        }
    }

    #[test]
    fn test_expected_score_symmetry() {
        assert_eq!(expected_score(1200.0, 1200.0), 0.5);
        let e = expected_score(1400.0, 1200.0);
        assert!((e + expected_score(1200.0, 1400.0) - 1.0).abs() < 1e-12);
        assert!(e > 0.75 && e < 0.77);
    }

    #[test]
    fn test_first_win_from_default() {
        let (a, b) = update_ratings(DEFAULT_RATING, DEFAULT_RATING, 1.0);
        assert_eq!(a, 1216.0);
        assert_eq!(b, 1184.0);
    }

    #[test]
    fn test_win_then_loss_does_not_restore() {
        let mut store = RatingStore::new();
        store.record_game("A", "B", ResultCode::GoatWins);
        store.record_game("B", "A", ResultCode::GoatWins);

        assert!(close(store.rating("A"), 1198.53));
        assert!(close(store.rating("B"), 1201.47));
        assert!((store.rating("A") + store.rating("B") - 2400.0).abs() < 1e-9);
    }

    #[test]
    fn test_draw_between_equals_is_neutral() {
        let mut store = RatingStore::new();
        assert!(store.record_game("A", "B", ResultCode::Draw));
        assert_eq!(store.rating("A"), DEFAULT_RATING);
        assert_eq!(store.rating("B"), DEFAULT_RATING);
    }

    #[test]
    fn test_unknown_result_skipped() {
        let mut store = RatingStore::new();
        let reporter = MemoryReporter::new();
        let stats = replay(
            &mut store,
            vec![
                summary("A", "B", ResultCode::Unknown),
                summary("A", "B", ResultCode::TigerWins),
            ],
            &reporter,
        );
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(store.rating("B"), 1216.0);
        assert_eq!(reporter.messages(Level::Warn).len(), 1);
    }

    #[test]
    fn test_ranked_descending() {
        let mut store = RatingStore::new();
        store.record_game("A", "B", ResultCode::GoatWins);
        store.record_game("C", "B", ResultCode::GoatWins);
        let ranked = store.ranked();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked.last().unwrap().0, "B");
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_replay_transcripts_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let game = |goat: &str, tiger: &str, result: &str| {
            format!(
                "[Event \"e\"]\n[White \"{} (Goat)\"]\n[Black \"{} (Tiger)\"]\n[Result \"{}\"]\n\n1. G11\n\n",
                goat, tiger, result
            )
        };

        // Later file holds B's win; earlier file A's win and an aborted game
        std::fs::write(
            dir.path().join("2025_01_02_090000_e_bestof1_B_vs_A.pgn"),
            game("B", "A", "1-0"),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("2025_01_01_e_bestof3_A_vs_B.pgn"),
            format!("{}{}", game("A", "B", "1-0"), game("B", "A", "*")),
        )
        .unwrap();
        std::fs::write(dir.path().join("undated.pgn"), game("A", "B", "0-1")).unwrap();

        let reporter = MemoryReporter::new();
        let (store, stats) = replay_transcripts(dir.path(), &reporter).unwrap();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.applied, 2);
        assert_eq!(stats.skipped, 1);
        assert!(close(store.rating("A"), 1198.53));
        assert!(close(store.rating("B"), 1201.47));
        // undated file and the aborted game
        assert_eq!(reporter.messages(Level::Warn).len(), 2);
    }

    #[test]
    fn test_persist_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = RatingStore::new();
        store.record_game("openai/gpt-4o", "random", ResultCode::GoatWins);

        let reporter = MemoryReporter::new();
        let written = persist(&store, dir.path(), &reporter);
        assert_eq!(written, 2);
        assert!(reporter.messages(Level::Error).is_empty());

        let rating = std::fs::read_to_string(dir.path().join("openaigpt4o.txt")).unwrap();
        assert_eq!(rating, "1216.00");
        let csv = std::fs::read_to_string(dir.path().join("summary.csv")).unwrap();
        assert_eq!(csv, "Model,ELO\nopenai/gpt-4o,1216.00\nrandom,1184.00\n");
    }

    #[test]
    fn test_summary_quotes_awkward_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = RatingStore::new();
        store.record_game("vendor/model,v2", "say \"hi\"", ResultCode::GoatWins);

        let reporter = MemoryReporter::new();
        persist(&store, dir.path(), &reporter);

        let mut rdr = csv::Reader::from_path(dir.path().join("summary.csv")).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == 2));
        assert_eq!(&rows[0][0], "vendor/model,v2");
        assert_eq!(&rows[0][1], "1216.00");
        assert_eq!(&rows[1][0], "say \"hi\"");
    }

    #[test]
    fn test_unwritable_summary_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("summary.csv")).unwrap();
        let mut store = RatingStore::new();
        store.record_game("A", "B", ResultCode::GoatWins);

        let reporter = MemoryReporter::new();
        let written = persist(&store, dir.path(), &reporter);

        assert_eq!(written, 2);
        assert_eq!(reporter.messages(Level::Error).len(), 1);
        assert_eq!(std::fs::read_to_string(dir.path().join("A.txt")).unwrap(), "1216.00");
        assert_eq!(store.rating("A"), 1216.0);
    }

    #[test]
    fn test_missing_elo_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("elos");
        std::fs::write(&blocker, "not a directory").unwrap();
        let mut store = RatingStore::new();
        store.record_game("A", "B", ResultCode::TigerWins);

        let reporter = MemoryReporter::new();
        assert_eq!(persist(&store, &blocker, &reporter), 0);
        assert_eq!(reporter.messages(Level::Error).len(), 1);
    }

    #[test]
    fn test_self_play_is_not_rated() {
        let mut store = RatingStore::new();
        let reporter = MemoryReporter::new();
        let stats = replay(
            &mut store,
            vec![
                summary("random", "random", ResultCode::GoatWins),
                summary("random", "random", ResultCode::GoatWins),
                summary("random", "random", ResultCode::GoatWins),
                summary("random", "B", ResultCode::Draw),
            ],
            &reporter,
        );

        assert_eq!(stats.applied, 1);
        assert_eq!(stats.skipped, 3);
        assert_eq!(store.rating("random"), DEFAULT_RATING);
        assert_eq!(reporter.messages(Level::Warn).len(), 3);
        assert!(!store.record_game("x", "x", ResultCode::TigerWins));
        assert_eq!(store.len(), 2);
    }
}
