//! Match-result artifacts - one JSON file per match
//!
//! Level 4 - Persistence

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{sanitize_name, ArenaPaths};
use crate::error::{ArenaError, Result};
use crate::match_play::MatchRecord;

/// Persisted match summary, enough to rebuild a tournament without replaying it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResultFile {
    pub model_a: String,
    pub model_b: String,
    pub score_a: f64,
    /// Per-move durations in seconds, keyed by agent
    pub durations: BTreeMap<String, Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_of: Option<u32>,
    #[serde(default)]
    pub wins_a: u32,
    #[serde(default)]
    pub wins_b: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub aborted: u32,
    #[serde(default)]
    pub games_played: u32,
}

impl MatchResultFile {
    pub fn from_match(record: &MatchRecord, experiment: &str) -> Self {
        Self {
            model_a: record.agent_a.clone(),
            model_b: record.agent_b.clone(),
            score_a: record.score_a(),
            durations: record.durations(),
            experiment: Some(experiment.to_string()),
            best_of: Some(record.best_of.games()),
            wins_a: record.wins_a(),
            wins_b: record.wins_b(),
            draws: record.draws,
            aborted: record.aborted,
            games_played: record.games_played(),
        }
    }

    /// Whole-file overwrite
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| ArenaError::io(format!("creating {}", dir.display()), e))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ArenaError::json(path.display().to_string(), e))?;
        std::fs::write(path, json)
            .map_err(|e| ArenaError::io(format!("writing {}", path.display()), e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ArenaError::io(format!("reading {}", path.display()), e))?;
        serde_json::from_str(&text).map_err(|e| ArenaError::json(path.display().to_string(), e))
    }
}

/// `<match_results>/<experiment>_<A>_vs_<B>.json`, agent names sanitized
pub fn result_path(paths: &ArenaPaths, experiment: &str, agent_a: &str, agent_b: &str) -> PathBuf {
    paths.match_results().join(format!(
        "{}_{}_vs_{}.json",
        experiment,
        sanitize_name(agent_a),
        sanitize_name(agent_b)
    ))
}
