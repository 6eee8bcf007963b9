//! Bagh-Chal Arena Tournament - Games, matches, tournaments and ratings
//!
//! This crate provides the arena infrastructure:
//! - Single games driven through a rule engine and chat provider
//! - Best-of-N matches with side alternation
//! - Round-robin tournaments, live or rebuilt from saved match results
//! - Transcript and match-result persistence
//! - Elo ratings replayed from transcripts
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_tournament, analyze_tournament (orchestration)
//! - Level 2: play_match, replay_transcripts (phases)
//! - Level 3: play_game (steps)
//! - Level 4: persistence, statistics, configuration

mod config;
mod elo;
mod error;
mod game_runner;
mod heatmap;
mod match_play;
mod results;
mod stats;
mod tournament;
mod transcript;

#[cfg(test)]
mod fixtures;

pub use config::{
    sanitize_name, ArenaPaths, BestOf, GameSettings, TournamentConfig, DEFAULT_MAX_MOVES,
    DEFAULT_MOVE_DELAY,
};
pub use elo::{
    expected_score, persist, replay, replay_transcripts, update_ratings, RatingStore,
    ReplayStats, DEFAULT_RATING, K_FACTOR,
};
pub use error::{ArenaError, Result};
pub use game_runner::{GameRecord, GameRunner, MoveTiming};
pub use heatmap::{heatmap_path, render_svg, write_heatmap};
pub use match_play::{a_plays_goat, play_match, MatchRecord};
pub use results::{result_path, MatchResultFile};
pub use stats::TimingStats;
pub use tournament::{
    analyze_tournament, build_roster, generate_commands, generate_round_robin_pairings,
    run_tournament, ScoreMatrix, Standing, TournamentReport,
};
pub use transcript::{
    discover_transcripts, file_stamp, parse_games, render_game, GameSummary, TranscriptLog, SITE,
};
