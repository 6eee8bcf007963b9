//! Configuration types for arena play
//!
//! Level 4 - Utilities and configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use baghchal_core::DEFAULT_ATTEMPTS;

use crate::error::ArenaError;

/// Hard cap on moves per game
pub const DEFAULT_MAX_MOVES: u32 = 200;

/// Delay between turns, to stay inside provider rate limits
pub const DEFAULT_MOVE_DELAY: Duration = Duration::from_secs(2);

/// Per-game settings
#[derive(Clone, Debug)]
pub struct GameSettings {
    /// Moves after which an unfinished game is aborted
    pub max_moves: u32,
    /// Sleep before each turn
    pub move_delay: Duration,
    /// Resolver attempts per turn
    pub attempts: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_moves: DEFAULT_MAX_MOVES,
            move_delay: DEFAULT_MOVE_DELAY,
            attempts: DEFAULT_ATTEMPTS,
        }
    }
}

impl GameSettings {
    /// Settings for offline runs: no throttling
    pub fn unthrottled() -> Self {
        Self {
            move_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    pub fn with_max_moves(mut self, max_moves: u32) -> Self {
        self.max_moves = max_moves;
        self
    }

    pub fn with_move_delay(mut self, move_delay: Duration) -> Self {
        self.move_delay = move_delay;
        self
    }

    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }
}

/// Best-of-N parameter. Always odd so a match cannot end tied on wins by count alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BestOf(u32);

impl BestOf {
    pub fn new(games: u32) -> Result<Self, ArenaError> {
        if games == 0 || games % 2 == 0 {
            return Err(ArenaError::Config(format!(
                "best-of must be a positive odd number, got {}",
                games
            )));
        }
        Ok(Self(games))
    }

    pub fn games(self) -> u32 {
        self.0
    }

    /// Wins that decide the match
    pub fn games_needed(self) -> u32 {
        self.0 / 2 + 1
    }
}

impl Default for BestOf {
    fn default() -> Self {
        Self(3)
    }
}

impl std::fmt::Display for BestOf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bestof{}", self.0)
    }
}

/// Tournament configuration
#[derive(Clone, Debug)]
pub struct TournamentConfig {
    /// Experiment name, used to scope every artifact
    pub experiment: String,
    /// Match length
    pub best_of: BestOf,
    /// Whether to render the score heat map
    pub heatmap: bool,
}

impl TournamentConfig {
    pub fn new(experiment: &str, best_of: BestOf) -> Self {
        Self {
            experiment: experiment.to_string(),
            best_of,
            heatmap: true,
        }
    }

    pub fn without_heatmap(mut self) -> Self {
        self.heatmap = false;
        self
    }
}

/// Artifact locations, all under one explicit root
#[derive(Clone, Debug)]
pub struct ArenaPaths {
    root: PathBuf,
}

impl ArenaPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Appended game transcripts
    pub fn game_logs(&self) -> PathBuf {
        self.root.join("game_logs")
    }

    /// One JSON result per match
    pub fn match_results(&self) -> PathBuf {
        self.root.join("match_results")
    }

    /// Run logs and heat maps
    pub fn tournament_logs(&self) -> PathBuf {
        self.root.join("tournament_logs")
    }

    /// Current ratings
    pub fn elos(&self) -> PathBuf {
        self.root.join("elos")
    }

    /// Create every artifact directory
    pub fn ensure(&self) -> Result<(), ArenaError> {
        for dir in [
            self.game_logs(),
            self.match_results(),
            self.tournament_logs(),
            self.elos(),
        ] {
            std::fs::create_dir_all(&dir)
                .map_err(|e| ArenaError::io(format!("creating {}", dir.display()), e))?;
        }
        Ok(())
    }
}

impl Default for ArenaPaths {
    fn default() -> Self {
        Self::new("logs")
    }
}

/// Keep only ASCII letters and digits, for use in file names
pub fn sanitize_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
