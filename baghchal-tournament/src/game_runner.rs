//! Game runner - plays single games between two agents
//!
//! Level 3 - Step-level implementation

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use baghchal_core::{
    ChatProvider, MoveResolver, Outcome, Reporter, Resolution, ResultCode, RuleEngine, Side,
    Termination, Verdict,
};

use crate::config::GameSettings;

/// Wall-clock time of one resolver call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveTiming {
    pub agent: String,
    pub side: Side,
    pub seconds: f64,
    /// Resolver attempts used (the full budget on a forfeit)
    pub attempts: usize,
}

/// Outcome of a single game
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRecord {
    /// Agent playing Goat (moves first)
    pub goat: String,
    /// Agent playing Tiger
    pub tiger: String,
    /// Moves applied, in order
    pub moves: Vec<String>,
    /// Engine transcript plus any forfeit/abort annotation
    pub transcript: String,
    pub outcome: Outcome,
    pub termination: Termination,
    pub move_count: u32,
    /// One entry per resolver call, including the failed last turn
    pub timings: Vec<MoveTiming>,
}

impl GameRecord {
    fn new(goat: &str, tiger: &str) -> Self {
        Self {
            goat: goat.to_string(),
            tiger: tiger.to_string(),
            moves: Vec::new(),
            transcript: String::new(),
            outcome: Outcome::Aborted,
            termination: Termination::EngineError,
            move_count: 0,
            timings: Vec::new(),
        }
    }

    /// Agent playing the given side
    pub fn agent(&self, side: Side) -> &str {
        match side {
            Side::Goat => &self.goat,
            Side::Tiger => &self.tiger,
        }
    }

    /// Winning agent, `None` for draws and aborted games
    pub fn winner_agent(&self) -> Option<&str> {
        self.outcome.winner().map(|side| self.agent(side))
    }

    pub fn result_code(&self) -> ResultCode {
        self.outcome.result_code()
    }

    /// Per-move durations of one agent, in seconds
    pub fn durations_for(&self, agent: &str) -> Vec<f64> {
        self.timings
            .iter()
            .filter(|t| t.agent == agent)
            .map(|t| t.seconds)
            .collect()
    }

    /// Per-move durations keyed by agent; both agents are always present
    pub fn durations(&self) -> BTreeMap<String, Vec<f64>> {
        let mut map = BTreeMap::new();
        map.insert(self.goat.clone(), self.durations_for(&self.goat));
        map.insert(self.tiger.clone(), self.durations_for(&self.tiger));
        map
    }

    /// Cumulative thinking time of one agent
    pub fn total_time(&self, agent: &str) -> f64 {
        self.durations_for(agent).iter().sum()
    }

    /// Human-readable winner, e.g. `Goat (model-a)`
    pub fn winner_label(&self) -> String {
        match self.outcome {
            Outcome::Win(side) => format!("{} ({})", side, self.agent(side)),
            Outcome::Draw => "Draw".to_string(),
            Outcome::Aborted => "Aborted/Unknown".to_string(),
        }
    }
}

/// Lifecycle of a game in progress
#[derive(Clone, Debug, PartialEq)]
enum GameState {
    InProgress,
    Completed(Verdict),
    /// Side that forfeited; its opponent wins
    Forfeited(Side),
    /// Side whose validated move the engine rejected; its opponent wins
    ErrorAborted(Side, String),
    /// Game over without a verdict, or the board could not be created
    NoVerdict(String),
    MoveLimit,
}

/// Plays games through a rule engine, asking agents for moves
pub struct GameRunner<'a, E: RuleEngine> {
    engine: E,
    provider: &'a dyn ChatProvider,
    reporter: &'a dyn Reporter,
    resolver: MoveResolver,
    settings: GameSettings,
}

impl<'a, E: RuleEngine> GameRunner<'a, E> {
    /// Create a new game runner
    pub fn new(
        engine: E,
        provider: &'a dyn ChatProvider,
        reporter: &'a dyn Reporter,
        settings: GameSettings,
    ) -> Self {
        Self {
            engine,
            provider,
            reporter,
            resolver: MoveResolver::new(settings.attempts),
            settings,
        }
    }

    pub fn reporter(&self) -> &'a dyn Reporter {
        self.reporter
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Play one game to completion, returning the finished record
    pub fn play_game(&mut self, goat: &str, tiger: &str) -> GameRecord {
        let mut record = GameRecord::new(goat, tiger);
        self.reporter
            .info(&format!("Starting Game: {} (Goat) vs {} (Tiger)", goat, tiger));

        let mut board = match self.engine.new_board() {
            Ok(board) => board,
            Err(e) => {
                self.reporter.error(&format!("Engine could not start game: {}", e));
                let state = GameState::NoVerdict(format!("engine could not start game: {}", e));
                self.finish(&mut record, String::new(), state);
                return record;
            }
        };

        let mut state = GameState::InProgress;
        while state == GameState::InProgress {
            if self.engine.is_game_over(&board) {
                state = match self.engine.winner(&board) {
                    Some(verdict) => GameState::Completed(verdict),
                    None => GameState::NoVerdict("engine declared game over without a winner".to_string()),
                };
            } else if record.move_count >= self.settings.max_moves {
                state = GameState::MoveLimit;
            } else {
                state = self.play_turn(&mut board, &mut record);
            }
        }

        let transcript = self.engine.transcript(&board);
        self.finish(&mut record, transcript, state);
        record
    }

    // ========================================================================
    // Level 4 - Turn handling
    // ========================================================================

    /// Ask the side to move for a move and apply it
    fn play_turn(&mut self, board: &mut E::Board, record: &mut GameRecord) -> GameState {
        if !self.settings.move_delay.is_zero() {
            std::thread::sleep(self.settings.move_delay);
        }

        let side = self.engine.side_to_move(board);
        let agent = record.agent(side).to_string();
        let view = self.engine.describe(board);
        let legal = self.engine.legal_moves(board);

        let started = Instant::now();
        let resolution = self
            .resolver
            .resolve(self.provider, &agent, &view, &legal, self.reporter);
        let seconds = started.elapsed().as_secs_f64();

        record.timings.push(MoveTiming {
            agent: agent.clone(),
            side,
            seconds,
            attempts: resolution.attempts(),
        });

        let mv = match resolution {
            Resolution::Move { mv, .. } => mv,
            Resolution::Forfeit { .. } => {
                self.reporter.info(&format!(
                    "Game aborted. {} ({}) failed to generate a valid move.",
                    agent, side
                ));
                return GameState::Forfeited(side);
            }
        };

        self.reporter.info(&format!(
            "Turn {}: {} ({}) plays {} ({:.2}s)",
            record.move_count + 1,
            side.letter(),
            agent,
            mv,
            seconds
        ));

        if let Err(e) = self.engine.apply_move(board, &mv) {
            self.reporter
                .error(&format!("Fatal error executing move {}: {}", mv, e));
            return GameState::ErrorAborted(side, format!("{} move {} rejected: {}", agent, mv, e));
        }

        record.moves.push(mv);
        record.move_count += 1;
        if let Some(position) = self.engine.position(board) {
            tracing::debug!("FEN: {}", position);
        }

        GameState::InProgress
    }

    /// Map the terminal state onto the record and annotate the transcript
    fn finish(&self, record: &mut GameRecord, transcript: String, state: GameState) {
        let (outcome, termination, note) = match state {
            GameState::Completed(verdict) => (Outcome::from(verdict), Termination::Normal, None),
            GameState::Forfeited(side) => (
                Outcome::Win(side.opponent()),
                Termination::Forfeit,
                Some(format!("Forfeit: {} made illegal move", record.agent(side))),
            ),
            GameState::ErrorAborted(side, detail) => (
                Outcome::Win(side.opponent()),
                Termination::EngineError,
                Some(format!("Error: {}", detail)),
            ),
            GameState::NoVerdict(detail) => (
                Outcome::Aborted,
                Termination::EngineError,
                Some(format!("Aborted: {}", detail)),
            ),
            GameState::MoveLimit => (
                Outcome::Aborted,
                Termination::MoveLimit,
                Some(format!("Aborted: move limit {} reached", self.settings.max_moves)),
            ),
            GameState::InProgress => (
                Outcome::Aborted,
                Termination::EngineError,
                Some("Aborted: game stopped while in progress".to_string()),
            ),
        };

        record.outcome = outcome;
        record.termination = termination;
        record.transcript = match note {
            Some(note) if transcript.is_empty() => format!("{{{}}}", note),
            Some(note) => format!("{} {{{}}}", transcript, note),
            None => transcript,
        };

        self.reporter.info(&format!(
            "Game Over! Winner: {} ({}, {} moves)",
            record.winner_label(),
            record.termination,
            record.move_count
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{FixtureProvider, GameScript, ScriptEngine};
    use baghchal_core::MemoryReporter;

    fn runner<'a>(
        engine: ScriptEngine,
        provider: &'a FixtureProvider,
        reporter: &'a MemoryReporter,
    ) -> GameRunner<'a, ScriptEngine> {
        GameRunner::new(engine, provider, reporter, GameSettings::unthrottled())
    }

    #[test]
    fn test_normal_win() {
        let provider = FixtureProvider::legal();
        let reporter = MemoryReporter::new();
        let mut runner = runner(ScriptEngine::new(vec![GameScript::tiger_wins(5)]), &provider, &reporter);

        let record = runner.play_game("alpha", "beta");
        assert_eq!(record.outcome, Outcome::Win(Side::Tiger));
        assert_eq!(record.termination, Termination::Normal);
        assert_eq!(record.move_count, 5);
        assert_eq!(record.moves.len(), 5);
        assert_eq!(record.winner_agent(), Some("beta"));
        assert_eq!(record.result_code(), ResultCode::TigerWins);
        assert!(!record.transcript.contains('{'));
    }

    #[test]
    fn test_timings_attributed_to_movers() {
        let provider = FixtureProvider::legal();
        let reporter = MemoryReporter::new();
        let mut runner = runner(ScriptEngine::new(vec![GameScript::goat_wins(5)]), &provider, &reporter);

        let record = runner.play_game("alpha", "beta");
        assert_eq!(record.timings.len(), 5);
        assert_eq!(record.durations_for("alpha").len(), 3);
        assert_eq!(record.durations_for("beta").len(), 2);
        assert!(record.timings.iter().all(|t| t.seconds >= 0.0));
        assert_eq!(record.durations().len(), 2);
    }

    #[test]
    fn test_forfeit_awards_opponent() {
        let provider = FixtureProvider::illegal_for(&["beta"]);
        let reporter = MemoryReporter::new();
        let mut runner = runner(ScriptEngine::new(vec![GameScript::goat_wins(10)]), &provider, &reporter);

        let record = runner.play_game("alpha", "beta");
        // Goat moves once, Tiger forfeits on its first turn
        assert_eq!(record.outcome, Outcome::Win(Side::Goat));
        assert_eq!(record.termination, Termination::Forfeit);
        assert_eq!(record.move_count, 1);
        assert!(record.transcript.ends_with("{Forfeit: beta made illegal move}"));
        // The failed turn is still timed
        assert_eq!(record.durations_for("beta").len(), 1);
        assert_eq!(record.timings[1].attempts, 3);
    }

    #[test]
    fn test_engine_rejection_aborts_game() {
        let provider = FixtureProvider::legal();
        let reporter = MemoryReporter::new();
        let engine = ScriptEngine::new(vec![GameScript::goat_wins(10)]).rejecting("G11");
        let mut runner = runner(engine, &provider, &reporter);

        let record = runner.play_game("alpha", "beta");
        assert_eq!(record.outcome, Outcome::Win(Side::Tiger));
        assert_eq!(record.termination, Termination::EngineError);
        assert_eq!(record.move_count, 0);
        assert!(record.transcript.contains("{Error: alpha move G11 rejected"));
    }

    #[test]
    fn test_move_cap_is_aborted_not_draw() {
        let provider = FixtureProvider::legal();
        let reporter = MemoryReporter::new();
        let engine = ScriptEngine::new(vec![GameScript::endless()]);
        let settings = GameSettings::unthrottled().with_max_moves(12);
        let mut runner = GameRunner::new(engine, &provider, &reporter, settings);

        let record = runner.play_game("alpha", "beta");
        assert_eq!(record.outcome, Outcome::Aborted);
        assert_eq!(record.termination, Termination::MoveLimit);
        assert_eq!(record.move_count, 12);
        assert_eq!(record.result_code(), ResultCode::Unknown);
        assert!(record.transcript.ends_with("{Aborted: move limit 12 reached}"));
    }

    #[test]
    fn test_engine_draw() {
        let provider = FixtureProvider::legal();
        let reporter = MemoryReporter::new();
        let mut runner = runner(ScriptEngine::new(vec![GameScript::draw(4)]), &provider, &reporter);

        let record = runner.play_game("alpha", "beta");
        assert_eq!(record.outcome, Outcome::Draw);
        assert_eq!(record.termination, Termination::Normal);
        assert_eq!(record.winner_agent(), None);
    }

    #[test]
    fn test_board_creation_failure() {
        let provider = FixtureProvider::legal();
        let reporter = MemoryReporter::new();
        let mut runner = runner(ScriptEngine::new(vec![]), &provider, &reporter);

        let record = runner.play_game("alpha", "beta");
        assert_eq!(record.outcome, Outcome::Aborted);
        assert_eq!(record.termination, Termination::EngineError);
        assert!(record.transcript.starts_with("{Aborted: engine could not start game"));
        assert!(record.timings.is_empty());
    }

    #[test]
    fn test_moves_always_legal() {
        let provider = FixtureProvider::legal();
        let reporter = MemoryReporter::new();
        let mut runner = runner(ScriptEngine::new(vec![GameScript::goat_wins(9)]), &provider, &reporter);

        let record = runner.play_game("alpha", "beta");
        for (i, mv) in record.moves.iter().enumerate() {
            let side = if i % 2 == 0 { Side::Goat } else { Side::Tiger };
            assert!(ScriptEngine::moves_for(side).contains(mv));
        }
    }
}
