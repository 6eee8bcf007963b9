//! HTTP adapter for the Bagh-Chal game service
//!
//! The service keeps games in memory and exposes them as JSON:
//! - `POST /api/games` creates a game and returns its id
//! - `GET /api/games/{id}` returns the full game state
//! - `POST /api/games/{id}/move` applies a move (400 when illegal)

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::engine::{BoardView, RuleEngine, BOARD_SIZE};
use crate::error::EngineError;
use crate::side::{Side, Verdict};

/// Game state as served by the game service
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RemoteState {
    pub board: Vec<Vec<serde_json::Value>>,
    pub turn: String,
    pub goats_placed: u32,
    pub goats_captured: u32,
    pub baghs_trapped: u32,
    pub game_over: bool,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub fen: String,
    #[serde(default)]
    pub pgn: String,
    #[serde(default)]
    pub possible_moves: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RemoteState {
    pub fn side_to_move(&self) -> Side {
        side_from_letter(&self.turn).unwrap_or(Side::Goat)
    }

    /// Interpret the service's winner field
    pub fn verdict(&self) -> Option<Verdict> {
        if !self.game_over {
            return None;
        }
        let winner = self.winner.as_deref()?.trim();
        if let Some(side) = side_from_letter(winner) {
            return Some(Verdict::Winner(side));
        }
        match winner.to_ascii_lowercase().as_str() {
            "draw" | "0" => Some(Verdict::Draw),
            _ => None,
        }
    }

    pub fn view(&self) -> BoardView {
        let mut view = BoardView::empty();
        view.goats_placed = self.goats_placed;
        view.goats_captured = self.goats_captured;
        view.tigers_trapped = self.baghs_trapped;
        view.to_move = self.side_to_move();

        // Some services pad the grid with an unused first row/column
        let row_skip = self.board.len().saturating_sub(BOARD_SIZE);
        for (r, row) in self.board.iter().skip(row_skip).take(BOARD_SIZE).enumerate() {
            let col_skip = row.len().saturating_sub(BOARD_SIZE);
            for (c, cell) in row.iter().skip(col_skip).take(BOARD_SIZE).enumerate() {
                view.grid[r][c] = cell.as_str().and_then(side_from_letter);
            }
        }
        view
    }
}

fn side_from_letter(letter: &str) -> Option<Side> {
    match letter.trim() {
        "G" => Some(Side::Goat),
        "B" => Some(Side::Tiger),
        _ => None,
    }
}

/// A game living on the service
#[derive(Clone, Debug)]
pub struct RemoteBoard {
    pub game_id: String,
    pub state: RemoteState,
}

#[derive(Serialize)]
struct CreateGame<'a> {
    mode: &'a str,
    difficulty: u32,
}

#[derive(Deserialize)]
struct Created {
    game_id: String,
}

#[derive(Serialize)]
struct MoveRequest<'a> {
    #[serde(rename = "move")]
    mv: &'a str,
}

#[derive(Deserialize)]
struct ErrorDetail {
    detail: String,
}

/// Rule engine backed by the game service
pub struct HttpEngine {
    client: Client,
    base_url: String,
}

impl HttpEngine {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn fetch_state(&self, game_id: &str) -> Result<RemoteState, EngineError> {
        let url = format!("{}/api/games/{}", self.base_url, game_id);
        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(EngineError::Unavailable(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }
        Ok(response.json()?)
    }
}

impl RuleEngine for HttpEngine {
    type Board = RemoteBoard;

    fn new_board(&mut self) -> Result<RemoteBoard, EngineError> {
        let url = format!("{}/api/games", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&CreateGame { mode: "CvC", difficulty: 3 })
            .send()?;
        if !response.status().is_success() {
            return Err(EngineError::Unavailable(format!(
                "POST {} returned {}",
                url,
                response.status()
            )));
        }
        let created: Created = response.json()?;
        let state = self.fetch_state(&created.game_id)?;
        tracing::debug!("Created remote game {}", created.game_id);

        Ok(RemoteBoard {
            game_id: created.game_id,
            state,
        })
    }

    fn legal_moves(&self, board: &RemoteBoard) -> BTreeSet<String> {
        board.state.possible_moves.iter().cloned().collect()
    }

    fn apply_move(&mut self, board: &mut RemoteBoard, mv: &str) -> Result<(), EngineError> {
        let url = format!("{}/api/games/{}/move", self.base_url, board.game_id);
        let response = self.client.post(&url).json(&MoveRequest { mv }).send()?;
        let status = response.status();

        if status.is_client_error() {
            let reason = response
                .json::<ErrorDetail>()
                .map(|e| e.detail)
                .unwrap_or_else(|_| status.to_string());
            return Err(EngineError::InvalidMove {
                mv: mv.to_string(),
                reason,
            });
        }
        if !status.is_success() {
            return Err(EngineError::Unavailable(format!("POST {} returned {}", url, status)));
        }

        board.state = response
            .json()
            .map_err(|e| EngineError::Protocol(e.to_string()))?;
        Ok(())
    }

    fn is_game_over(&self, board: &RemoteBoard) -> bool {
        board.state.game_over
    }

    fn winner(&self, board: &RemoteBoard) -> Option<Verdict> {
        board.state.verdict()
    }

    fn side_to_move(&self, board: &RemoteBoard) -> Side {
        board.state.side_to_move()
    }

    fn describe(&self, board: &RemoteBoard) -> BoardView {
        board.state.view()
    }

    fn transcript(&self, board: &RemoteBoard) -> String {
        board.state.pgn.clone()
    }

    fn position(&self, board: &RemoteBoard) -> Option<String> {
        Some(board.state.fen.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> RemoteState {
        let json = r#"{
            "board": [
                ["B", "", "", "", "B"],
                ["", "", "", "", ""],
                ["", "", "G", "", ""],
                ["", "", "", "", ""],
                ["B", "", "", "", "B"]
            ],
            "turn": "B",
            "goats_placed": 1,
            "goats_captured": 0,
            "baghs_trapped": 0,
            "game_over": false,
            "winner": null,
            "fen": "B3B/5/2G2/5/B3B B 1 0",
            "pgn": "1. G33",
            "possible_moves": ["B1112", "B1121", "B5554"]
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_view_from_state() {
        let view = sample_state().view();
        assert_eq!(view.to_move, Side::Tiger);
        assert_eq!(view.goats_placed, 1);
        assert_eq!(view.grid[0][0], Some(Side::Tiger));
        assert_eq!(view.grid[2][2], Some(Side::Goat));
        assert_eq!(view.grid[1][1], None);
    }

    #[test]
    fn test_view_skips_padding() {
        let mut state = sample_state();
        state.board.insert(0, vec![serde_json::Value::from(0); 6]);
        for row in state.board.iter_mut().skip(1) {
            row.insert(0, serde_json::Value::from(0));
        }
        let view = state.view();
        assert_eq!(view.grid[0][0], Some(Side::Tiger));
        assert_eq!(view.grid[2][2], Some(Side::Goat));
    }

    #[test]
    fn test_verdict_parsing() {
        let mut state = sample_state();
        assert_eq!(state.verdict(), None);

        state.game_over = true;
        state.winner = Some("G".to_string());
        assert_eq!(state.verdict(), Some(Verdict::Winner(Side::Goat)));

        state.winner = Some("B".to_string());
        assert_eq!(state.verdict(), Some(Verdict::Winner(Side::Tiger)));

        state.winner = Some("Draw".to_string());
        assert_eq!(state.verdict(), Some(Verdict::Draw));

        state.winner = Some("???".to_string());
        assert_eq!(state.verdict(), None);

        state.winner = None;
        assert_eq!(state.verdict(), None);
    }
}
