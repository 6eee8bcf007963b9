//! Sides, game outcomes and PGN result codes

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Game role. Goat always moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Goat = 0,
    Tiger = 1,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Goat => Side::Tiger,
            Side::Tiger => Side::Goat,
        }
    }

    /// Piece letter used by the rule engine (`G` / `B` for bagh)
    pub fn letter(self) -> char {
        match self {
            Side::Goat => 'G',
            Side::Tiger => 'B',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Goat => "Goat",
            Side::Tiger => "Tiger",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the rule engine declares once a game is over
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Winner(Side),
    Draw,
}

/// Final outcome of a recorded game.
///
/// `Aborted` means the game ended without a verdict (move cap, engine failure
/// before any verdict). It is never scored as a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win(Side),
    Draw,
    Aborted,
}

impl Outcome {
    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::Win(side) => Some(side),
            Outcome::Draw | Outcome::Aborted => None,
        }
    }

    pub fn result_code(self) -> ResultCode {
        match self {
            Outcome::Win(Side::Goat) => ResultCode::GoatWins,
            Outcome::Win(Side::Tiger) => ResultCode::TigerWins,
            Outcome::Draw => ResultCode::Draw,
            Outcome::Aborted => ResultCode::Unknown,
        }
    }
}

impl From<Verdict> for Outcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Winner(side) => Outcome::Win(side),
            Verdict::Draw => Outcome::Draw,
        }
    }
}

/// Why a game stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The engine declared the game over
    Normal,
    /// An agent exhausted its attempts without a legal move
    Forfeit,
    /// The engine failed to create a board, apply a validated move, or name a verdict
    EngineError,
    /// The move cap was reached before the engine declared the game over
    MoveLimit,
}

impl Termination {
    pub fn as_str(self) -> &'static str {
        match self {
            Termination::Normal => "Normal",
            Termination::Forfeit => "Illegal Move",
            Termination::EngineError => "Error",
            Termination::MoveLimit => "Move Limit",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PGN result code, always from the Goat (White) perspective
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResultCode {
    GoatWins,
    TigerWins,
    Draw,
    Unknown,
}

impl ResultCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultCode::GoatWins => "1-0",
            ResultCode::TigerWins => "0-1",
            ResultCode::Draw => "1/2-1/2",
            ResultCode::Unknown => "*",
        }
    }

    /// Parse a header value; anything unrecognised is `None`
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "1-0" => Some(ResultCode::GoatWins),
            "0-1" => Some(ResultCode::TigerWins),
            "1/2-1/2" => Some(ResultCode::Draw),
            "*" => Some(ResultCode::Unknown),
            _ => None,
        }
    }

    /// Score for the Goat player, `None` when the game has no usable result
    pub fn goat_score(self) -> Option<f64> {
        match self {
            ResultCode::GoatWins => Some(1.0),
            ResultCode::TigerWins => Some(0.0),
            ResultCode::Draw => Some(0.5),
            ResultCode::Unknown => None,
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
