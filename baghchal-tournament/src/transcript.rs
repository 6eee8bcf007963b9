//! Transcript artifacts - append-only PGN files, one per match
//!
//! Level 4 - Persistence

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;

use baghchal_core::{Reporter, ResultCode};

use crate::config::{sanitize_name, ArenaPaths, BestOf};
use crate::error::{ArenaError, Result};
use crate::game_runner::GameRecord;

pub const SITE: &str = "Bagh-Chal LLM Arena";

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\[(\w+)\s+"(.*)"\]\s*$"#).expect("valid header regex"));

static PLAYER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\((?:Goat|Tiger)\)$").expect("valid player regex"));

static STAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})_(\d{2})_(\d{2})(?:_(\d{2})(\d{2})(\d{2})(\d{3})?)?(?:_|$)")
        .expect("valid stamp regex")
});

/// Last stamp handed out by this process, in epoch milliseconds
static LAST_STAMP: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current local time at millisecond precision, strictly later than any
/// earlier call in this process so same-millisecond matches keep play order
fn next_stamp() -> DateTime<Local> {
    let now = Local::now().timestamp_millis();
    let prev = LAST_STAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or_else(|last| last);
    let millis = now.max(prev.saturating_add(1));
    Local.timestamp_millis_opt(millis).single().unwrap_or_else(Local::now)
}

// ============================================================================
// Writing
// ============================================================================

/// Transcript file of one match; games are appended as they finish
#[derive(Clone, Debug)]
pub struct TranscriptLog {
    path: PathBuf,
    event: String,
}

impl TranscriptLog {
    /// Timestamped transcript for a new match under `paths.game_logs()`
    pub fn for_match(
        paths: &ArenaPaths,
        experiment: &str,
        best_of: BestOf,
        agent_a: &str,
        agent_b: &str,
    ) -> Self {
        let file_name = format!(
            "{}_{}_{}_{}_vs_{}.pgn",
            next_stamp().format("%Y_%m_%d_%H%M%S%3f"),
            experiment,
            best_of,
            sanitize_name(agent_a),
            sanitize_name(agent_b)
        );
        Self::at(paths.game_logs().join(file_name), &format!("{} {}", experiment, best_of))
    }

    pub fn at(path: impl Into<PathBuf>, event: &str) -> Self {
        Self {
            path: path.into(),
            event: event.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one finished game
    pub fn append(&self, record: &GameRecord, round: u32) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| ArenaError::io(format!("creating {}", dir.display()), e))?;
        }

        let date = Local::now().date_naive();
        let text = render_game(record, &self.event, round, date);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ArenaError::io(format!("opening {}", self.path.display()), e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| ArenaError::io(format!("appending to {}", self.path.display()), e))
    }
}

/// Render one game as a PGN block
pub fn render_game(record: &GameRecord, event: &str, round: u32, date: NaiveDate) -> String {
    format!(
        "[Event \"{}\"]\n\
         [Site \"{}\"]\n\
         [Date \"{}\"]\n\
         [Round \"{}\"]\n\
         [White \"{} (Goat)\"]\n\
         [Black \"{} (Tiger)\"]\n\
         [Result \"{}\"]\n\
         [Termination \"{}\"]\n\
         \n\
         {}\n\
         \n",
        event,
        SITE,
        date.format("%Y.%m.%d"),
        round,
        record.goat,
        record.tiger,
        record.result_code(),
        record.termination,
        record.transcript
    )
}

// ============================================================================
// Reading
// ============================================================================

/// Who played which side and how it ended, as read back from a transcript
#[derive(Clone, Debug, PartialEq)]
pub struct GameSummary {
    pub goat: String,
    pub tiger: String,
    pub result: ResultCode,
}

/// Parse every game in a transcript file's text, in file order.
///
/// A game whose headers are missing or unreadable yields an error entry;
/// the remaining games are still returned.
pub fn parse_games(text: &str) -> Vec<Result<GameSummary>> {
    let mut games = Vec::new();
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        let Some(caps) = HEADER.captures(line.trim()) else {
            continue;
        };
        let key = caps[1].to_string();
        if key == "Event" && !headers.is_empty() {
            games.push(summarize(&headers, games.len() + 1));
            headers.clear();
        }
        headers.push((key, caps[2].to_string()));
    }
    if !headers.is_empty() {
        games.push(summarize(&headers, games.len() + 1));
    }

    games
}

fn summarize(headers: &[(String, String)], index: usize) -> Result<GameSummary> {
    let get = |name: &str| {
        headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| ArenaError::Malformed(format!("game {}: missing {} header", index, name)))
    };

    let result = get("Result")?;
    let result = ResultCode::parse(result)
        .ok_or_else(|| ArenaError::Malformed(format!("game {}: unknown result '{}'", index, result)))?;

    Ok(GameSummary {
        goat: player_name(get("White")?),
        tiger: player_name(get("Black")?),
        result,
    })
}

/// Strip the ` (Goat)` / ` (Tiger)` suffix from a player header
fn player_name(header: &str) -> String {
    PLAYER
        .captures(header)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| header.trim().to_string())
}

/// Timestamp prefix of a transcript file name, `YYYY_MM_DD[_HHMMSS[mmm]]_...`
pub fn file_stamp(file_name: &str) -> Option<NaiveDateTime> {
    let caps = STAMP.captures(file_name)?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let date = NaiveDate::from_ymd_opt(num(1)? as i32, num(2)?, num(3)?)?;
    match (num(4), num(5), num(6)) {
        (Some(h), Some(m), Some(s)) => date.and_hms_milli_opt(h, m, s, num(7).unwrap_or(0)),
        _ => date.and_hms_opt(0, 0, 0),
    }
}

/// Transcript files under `dir` in chronological order.
///
/// Files without a timestamp prefix cannot be ordered; they are reported and left out.
pub fn discover_transcripts(dir: &Path, reporter: &dyn Reporter) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.pgn", dir.display());
    let entries = glob::glob(&pattern)
        .map_err(|e| ArenaError::Config(format!("bad transcript pattern {}: {}", pattern, e)))?;

    let mut stamped = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                reporter.warn(&format!("Skipping unreadable transcript entry: {}", e));
                continue;
            }
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match file_stamp(&name) {
            Some(stamp) => stamped.push((stamp, name, path)),
            None => reporter.warn(&format!(
                "Skipping {}: file name has no timestamp prefix",
                path.display()
            )),
        }
    }

    stamped.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    Ok(stamped.into_iter().map(|(_, _, path)| path).collect())
}
