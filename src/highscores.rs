//! High score leaderboard
//!
//! Persisted as a small JSON document `{"scores": [..]}`, best first, at
//! most [`MAX_HIGH_SCORES`] entries.

use color_eyre::eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Default location of the leaderboard file
pub const DEFAULT_HIGH_SCORES_PATH: &str = "data/high_scores.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScores {
    scores: Vec<u32>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the leaderboard. A missing or unreadable file means no scores yet.
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::info!("No high scores at {} ({err}), starting fresh", path.display());
                return Self::new();
            }
        };

        match serde_json::from_str::<HighScores>(&json) {
            Ok(mut loaded) => {
                loaded.normalize();
                log::info!("Loaded {} high scores", loaded.scores.len());
                loaded
            }
            Err(err) => {
                log::warn!("Ignoring corrupt high score file {}: {err}", path.display());
                Self::new()
            }
        }
    }

    /// Write the leaderboard, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> color_eyre::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).wrap_err_with(|| format!("writing {}", path.display()))?;
        log::info!("High scores saved ({} entries)", self.scores.len());
        Ok(())
    }

    /// Whether a score would make the board
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        self.scores.len() < MAX_HIGH_SCORES || self.scores.last().is_some_and(|&low| score > low)
    }

    /// Add a score if it qualifies. Returns the rank achieved (1-indexed).
    pub fn submit(&mut self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        // Ties go below the existing entry
        let pos = self
            .scores
            .iter()
            .position(|&s| score > s)
            .unwrap_or(self.scores.len());
        self.scores.insert(pos, score);
        self.scores.truncate(MAX_HIGH_SCORES);
        Some(pos + 1)
    }

    pub fn top_score(&self) -> Option<u32> {
        self.scores.first().copied()
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Hand-edited files may be unsorted or too long
    fn normalize(&mut self) {
        self.scores.sort_unstable_by(|a, b| b.cmp(a));
        self.scores.truncate(MAX_HIGH_SCORES);
    }
}
