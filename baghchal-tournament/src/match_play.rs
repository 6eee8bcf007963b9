//! Match play - best-of-N games between two agents
//!
//! Level 2 - Phase-level implementation

use std::collections::BTreeMap;

use baghchal_core::{Outcome, RuleEngine, Side};

use crate::config::BestOf;
use crate::game_runner::{GameRecord, GameRunner};
use crate::transcript::TranscriptLog;

/// Result of a match (multiple games)
#[derive(Clone, Debug)]
pub struct MatchRecord {
    pub agent_a: String,
    pub agent_b: String,
    pub best_of: BestOf,
    /// Games in play order
    pub games: Vec<GameRecord>,
    wins_a: u32,
    wins_b: u32,
    /// Games the engine declared drawn
    pub draws: u32,
    /// Games with no result (move cap, engine failure)
    pub aborted: u32,
}

impl MatchRecord {
    /// Create empty result
    pub fn new(agent_a: &str, agent_b: &str, best_of: BestOf) -> Self {
        Self {
            agent_a: agent_a.to_string(),
            agent_b: agent_b.to_string(),
            best_of,
            games: Vec::new(),
            wins_a: 0,
            wins_b: 0,
            draws: 0,
            aborted: 0,
        }
    }

    pub fn wins_a(&self) -> u32 {
        self.wins_a
    }

    pub fn wins_b(&self) -> u32 {
        self.wins_b
    }

    pub fn games_played(&self) -> u32 {
        self.games.len() as u32
    }

    /// True once either agent holds a majority of the best-of-N
    pub fn is_decided(&self) -> bool {
        let needed = self.best_of.games_needed();
        self.wins_a >= needed || self.wins_b >= needed
    }

    /// Match score for A: 1.0 win, 0.0 loss, 0.5 tie on wins
    pub fn score_a(&self) -> f64 {
        match self.wins_a.cmp(&self.wins_b) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Less => 0.0,
            std::cmp::Ordering::Equal => 0.5,
        }
    }

    pub fn score_b(&self) -> f64 {
        1.0 - self.score_a()
    }

    /// Match winner, `None` on a tie
    pub fn winner(&self) -> Option<&str> {
        match self.wins_a.cmp(&self.wins_b) {
            std::cmp::Ordering::Greater => Some(self.agent_a.as_str()),
            std::cmp::Ordering::Less => Some(self.agent_b.as_str()),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Per-move durations over all games, keyed by agent
    pub fn durations(&self) -> BTreeMap<String, Vec<f64>> {
        let mut map: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        map.entry(self.agent_a.clone()).or_default();
        map.entry(self.agent_b.clone()).or_default();
        for game in &self.games {
            for timing in &game.timings {
                map.entry(timing.agent.clone()).or_default().push(timing.seconds);
            }
        }
        map
    }

    /// Score a finished game. Wins are attributed by role, so self-play still counts.
    ///
    /// Once either agent holds a majority the tally is closed: the game is
    /// refused and false returned, so no agent passes `games_needed`.
    fn record(&mut self, round: u32, game: GameRecord) -> bool {
        if self.is_decided() {
            return false;
        }
        match game.outcome {
            Outcome::Win(side) => {
                let a_side = if a_plays_goat(round) { Side::Goat } else { Side::Tiger };
                if side == a_side {
                    self.wins_a += 1;
                } else {
                    self.wins_b += 1;
                }
            }
            Outcome::Draw => self.draws += 1,
            Outcome::Aborted => self.aborted += 1,
        }
        self.games.push(game);
        true
    }
}

/// Agent A plays Goat in odd-numbered games (1-based), Tiger in even ones
pub fn a_plays_goat(round: u32) -> bool {
    round % 2 == 1
}

/// Play a best-of-N match, stopping as soon as one agent has a majority.
///
/// Each game is appended to `transcript` as soon as it ends; a failed append
/// is reported and play continues.
pub fn play_match<E: RuleEngine>(
    runner: &mut GameRunner<'_, E>,
    agent_a: &str,
    agent_b: &str,
    best_of: BestOf,
    transcript: Option<&TranscriptLog>,
) -> MatchRecord {
    let reporter = runner.reporter();
    reporter.info(&format!(
        "Starting Match: {} vs {} (Best of {})",
        agent_a,
        agent_b,
        best_of.games()
    ));

    let mut record = MatchRecord::new(agent_a, agent_b, best_of);
    for round in 1..=best_of.games() {
        if record.is_decided() {
            break;
        }

        let (goat, tiger) = if a_plays_goat(round) {
            (agent_a, agent_b)
        } else {
            (agent_b, agent_a)
        };
        reporter.info(&format!("Game {}: {} (Goat) vs {} (Tiger)", round, goat, tiger));

        let game = runner.play_game(goat, tiger);
        if let Some(log) = transcript {
            if let Err(e) = log.append(&game, round) {
                reporter.error(&format!("Failed to save game {} transcript: {}", round, e));
            }
        }
        if !record.record(round, game) {
            break;
        }

        reporter.info(&format!(
            "Score after game {}: {} {} - {} {} (draws {}, aborted {})",
            round, agent_a, record.wins_a, record.wins_b, agent_b, record.draws, record.aborted
        ));
    }

    match record.winner() {
        Some(winner) => reporter.info(&format!("Match winner: {}", winner)),
        None => reporter.info("Match tied"),
    }
    record
}
