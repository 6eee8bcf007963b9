//! Prompt construction and reply cleaning for the move protocol

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::engine::BoardView;
use crate::side::Side;

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid bracket pattern"));
static MOVE_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Valid Moves: \[([^\]]*)\]").expect("valid move-list pattern"));

/// Fixed instructions sent as the system message
pub fn system_prompt() -> &'static str {
    "You are playing the board game Bagh-Chal (Tiger and Goat).\n\
     You are an expert player.\n\
     The board is a 5x5 grid. Coordinates are RowColumn (e.g., 11 is top-left, 55 is bottom-right).\n\
     Goat (G) wins by trapping all 4 Tigers.\n\
     Tiger (B) wins by capturing 5 Goats.\n\
     Moves are in PGN format (e.g., 'G11' to place goat at 1,1; 'B1112' to move tiger from 1,1 to 1,2).\n\
     Output ONLY the move string from the list of valid moves. Do not add explanation."
}

/// Legal moves as a sorted, comma separated list
pub fn format_moves(moves: &BTreeSet<String>) -> String {
    moves.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Natural-language description of the position
pub fn describe_board(view: &BoardView) -> String {
    format!(
        "Board State (5x5 Grid):\n{}\n\n\
         Goats Placed: {}/20\n\
         Goats Captured: {}/5\n\
         Tigers Trapped: {}/4\n\
         Current Turn: {}\n",
        view.grid_lines().join("\n"),
        view.goats_placed,
        view.goats_captured,
        view.tigers_trapped,
        turn_label(view.to_move),
    )
}

fn turn_label(side: Side) -> String {
    format!("{} ({})", side.name(), side.letter())
}

/// User message for the first attempt of a turn
pub fn move_request(view: &BoardView, moves: &BTreeSet<String>) -> String {
    format!(
        "{}\nValid Moves: [{}]\nYou are playing as {}.\n\
         Choose the best move from the list above. Return ONLY the move string.",
        describe_board(view),
        format_moves(moves),
        view.to_move.name(),
    )
}

/// User message sent after an illegal or unparseable reply
pub fn correction(reply: &str, moves: &BTreeSet<String>) -> String {
    format!(
        "Invalid move '{}'. The valid moves are: [{}]. Please output ONLY the move string from the list.",
        reply,
        format_moves(moves),
    )
}

/// Extract the candidate move token from a free-text reply.
///
/// Strips markup tags, bracketed segments, emphasis and code fences, then takes
/// the first whitespace-delimited token without quotes or periods.
pub fn extract_move(reply: &str) -> String {
    let cleaned = MARKUP_TAG.replace_all(reply.trim(), "");
    let cleaned = BRACKETED.replace_all(&cleaned, "");
    let cleaned = cleaned.replace(['*', '`'], "");

    cleaned
        .split_whitespace()
        .next()
        .map(|token| token.replace(['\'', '"', '.'], ""))
        .unwrap_or_default()
}

/// Recover the legal-move list from a move request or correction message
pub fn parse_move_list(message: &str) -> Vec<String> {
    let list = MOVE_LIST
        .captures_iter(message)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .or_else(|| {
            message
                .split_once("The valid moves are: [")
                .and_then(|(_, rest)| rest.split_once(']'))
                .map(|(list, _)| list)
        });

    list.map(|l| {
        l.split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_extract_plain_move() {
        assert_eq!(extract_move("G11"), "G11");
        assert_eq!(extract_move("  G11 extra text"), "G11");
    }

    #[test]
    fn test_extract_strips_markup() {
        assert_eq!(extract_move("<s>**G22**</s>"), "G22");
        assert_eq!(extract_move("[OUT] `B1112`"), "B1112");
        assert_eq!(extract_move("'G33'."), "G33");
        assert_eq!(extract_move("\"G44\""), "G44");
    }

    #[test]
    fn test_extract_empty_reply() {
        assert_eq!(extract_move(""), "");
        assert_eq!(extract_move("<think></think>"), "");
    }

    #[test]
    fn test_move_request_lists_sorted_moves() {
        let view = BoardView::empty();
        let text = move_request(&view, &moves(&["G22", "G11"]));
        assert!(text.contains("Valid Moves: [G11, G22]"));
        assert!(text.contains("Current Turn: Goat (G)"));
        assert!(text.contains("You are playing as Goat."));
        assert!(text.contains("Goats Placed: 0/20"));
    }

    #[test]
    fn test_parse_move_list_roundtrip() {
        let legal = moves(&["B1112", "B1121"]);
        let request = move_request(&BoardView::empty(), &legal);
        assert_eq!(parse_move_list(&request), vec!["B1112", "B1121"]);

        let fix = correction("nope", &legal);
        assert_eq!(parse_move_list(&fix), vec!["B1112", "B1121"]);

        assert!(parse_move_list("no list here").is_empty());
    }
}
