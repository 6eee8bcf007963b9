//! Scripted engine and provider shared by the unit tests

use std::collections::{BTreeSet, VecDeque};

use baghchal_core::prompt::parse_move_list;
use baghchal_core::{
    BoardView, ChatMessage, ChatProvider, ChatRole, EngineError, ProviderError, RuleEngine, Side,
    Verdict,
};

/// How one scripted game ends
#[derive(Clone, Copy, Debug)]
pub struct GameScript {
    pub length: u32,
    pub verdict: Option<Verdict>,
}

impl GameScript {
    pub fn goat_wins(length: u32) -> Self {
        Self { length, verdict: Some(Verdict::Winner(Side::Goat)) }
    }

    pub fn tiger_wins(length: u32) -> Self {
        Self { length, verdict: Some(Verdict::Winner(Side::Tiger)) }
    }

    pub fn draw(length: u32) -> Self {
        Self { length, verdict: Some(Verdict::Draw) }
    }

    /// Never finishes on its own
    pub fn endless() -> Self {
        Self { length: u32::MAX, verdict: None }
    }
}

pub struct ScriptBoard {
    played: Vec<String>,
    script: GameScript,
}

/// Engine whose games end after a fixed number of moves with a fixed verdict.
/// `new_board` fails once the scripts run out.
pub struct ScriptEngine {
    scripts: VecDeque<GameScript>,
    reject: Option<String>,
}

impl ScriptEngine {
    pub fn new(scripts: Vec<GameScript>) -> Self {
        Self {
            scripts: scripts.into(),
            reject: None,
        }
    }

    /// Advertise `mv` as legal but fail when it is applied
    pub fn rejecting(mut self, mv: &str) -> Self {
        self.reject = Some(mv.to_string());
        self
    }

    pub fn moves_for(side: Side) -> BTreeSet<String> {
        let moves: &[&str] = match side {
            Side::Goat => &["G11", "G22"],
            Side::Tiger => &["B1112", "B5554"],
        };
        moves.iter().map(|m| m.to_string()).collect()
    }

    pub fn remaining(&self) -> usize {
        self.scripts.len()
    }
}

impl RuleEngine for ScriptEngine {
    type Board = ScriptBoard;

    fn new_board(&mut self) -> Result<ScriptBoard, EngineError> {
        let script = self
            .scripts
            .pop_front()
            .ok_or_else(|| EngineError::Unavailable("no scripted games left".to_string()))?;
        Ok(ScriptBoard { played: Vec::new(), script })
    }

    fn legal_moves(&self, board: &ScriptBoard) -> BTreeSet<String> {
        Self::moves_for(self.side_to_move(board))
    }

    fn apply_move(&mut self, board: &mut ScriptBoard, mv: &str) -> Result<(), EngineError> {
        if self.reject.as_deref() == Some(mv) {
            return Err(EngineError::InvalidMove {
                mv: mv.to_string(),
                reason: "scripted rejection".to_string(),
            });
        }
        board.played.push(mv.to_string());
        Ok(())
    }

    fn is_game_over(&self, board: &ScriptBoard) -> bool {
        board.script.verdict.is_some() && board.played.len() as u32 >= board.script.length
    }

    fn winner(&self, board: &ScriptBoard) -> Option<Verdict> {
        if self.is_game_over(board) {
            board.script.verdict
        } else {
            None
        }
    }

    fn side_to_move(&self, board: &ScriptBoard) -> Side {
        if board.played.len() % 2 == 0 {
            Side::Goat
        } else {
            Side::Tiger
        }
    }

    fn describe(&self, board: &ScriptBoard) -> BoardView {
        BoardView {
            to_move: self.side_to_move(board),
            ..BoardView::empty()
        }
    }

    fn transcript(&self, board: &ScriptBoard) -> String {
        board
            .played
            .chunks(2)
            .enumerate()
            .map(|(i, pair)| format!("{}. {}", i + 1, pair.join(" ")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Answers with the first listed move, or an illegal one for chosen agents
pub struct FixtureProvider {
    illegal: Vec<String>,
}

impl FixtureProvider {
    pub fn legal() -> Self {
        Self { illegal: Vec::new() }
    }

    pub fn illegal_for(agents: &[&str]) -> Self {
        Self {
            illegal: agents.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl ChatProvider for FixtureProvider {
    fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        if self.illegal.iter().any(|a| a == model) {
            return Ok("G99".to_string());
        }
        let moves = messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| parse_move_list(&m.content))
            .unwrap_or_default();
        moves.into_iter().next().ok_or(ProviderError::EmptyResponse)
    }
}
