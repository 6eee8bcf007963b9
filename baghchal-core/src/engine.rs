//! Rule-engine seam
//!
//! The arena never implements Bagh-Chal rules. Everything it needs from a
//! game (legal moves, move application, verdicts, transcripts) comes through
//! [`RuleEngine`].

use std::collections::BTreeSet;

use crate::error::EngineError;
use crate::side::{Side, Verdict};

/// Board size (5x5 intersections)
pub const BOARD_SIZE: usize = 5;

/// Snapshot of a position in the shape the prompt needs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardView {
    /// Row-major grid, `None` for an empty point
    pub grid: [[Option<Side>; BOARD_SIZE]; BOARD_SIZE],
    pub goats_placed: u32,
    pub goats_captured: u32,
    pub tigers_trapped: u32,
    pub to_move: Side,
}

impl BoardView {
    /// Empty board with the Goat to move
    pub fn empty() -> Self {
        Self {
            grid: [[None; BOARD_SIZE]; BOARD_SIZE],
            goats_placed: 0,
            goats_captured: 0,
            tigers_trapped: 0,
            to_move: Side::Goat,
        }
    }

    /// Grid rows as text, `.` for an empty point
    pub fn grid_lines(&self) -> Vec<String> {
        self.grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or('.', Side::letter).to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

/// Game rules, provided by an external engine.
///
/// Read accessors work on the board snapshot and never fail; only board
/// creation and move application talk to the engine.
pub trait RuleEngine {
    type Board;

    /// Start a fresh game
    fn new_board(&mut self) -> Result<Self::Board, EngineError>;

    /// Legal moves for the side to move
    fn legal_moves(&self, board: &Self::Board) -> BTreeSet<String>;

    /// Apply a move, failing with [`EngineError::InvalidMove`] when the engine rejects it
    fn apply_move(&mut self, board: &mut Self::Board, mv: &str) -> Result<(), EngineError>;

    fn is_game_over(&self, board: &Self::Board) -> bool;

    /// Declared result, `None` while the game is running or when the engine gives none
    fn winner(&self, board: &Self::Board) -> Option<Verdict>;

    fn side_to_move(&self, board: &Self::Board) -> Side;

    fn describe(&self, board: &Self::Board) -> BoardView;

    /// Serialized move transcript (PGN movetext)
    fn transcript(&self, board: &Self::Board) -> String;

    /// Serialized position, for debug logging
    fn position(&self, _board: &Self::Board) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_lines() {
        let mut view = BoardView::empty();
        view.grid[0][0] = Some(Side::Tiger);
        view.grid[2][3] = Some(Side::Goat);

        let lines = view.grid_lines();
        assert_eq!(lines.len(), BOARD_SIZE);
        assert_eq!(lines[0], "B . . . .");
        assert_eq!(lines[2], ". . . G .");
    }
}
