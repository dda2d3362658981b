//! High score leaderboard
//!
//! Top 10 finished games. Bowling scores cap at 300, so ties are common;
//! ties break on strike count, then first-in wins.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Maximum number of entries to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished game on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub player: String,
    /// Final game score, 0-300
    pub score: u16,
    /// Strikes thrown in that game
    pub strikes: u8,
    /// Unix timestamp (seconds) when achieved
    pub timestamp: u64,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    fn beats(score: u16, strikes: u8, other: &HighScoreEntry) -> bool {
        score > other.score || (score == other.score && strikes > other.strikes)
    }

    /// Whether a finished game would make the board
    pub fn qualifies(&self, score: u16, strikes: u8) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .last()
            .map(|e| Self::beats(score, strikes, e))
            .unwrap_or(true)
    }

    /// Insert a finished game. Returns the 1-indexed rank achieved, or None
    /// if it didn't qualify.
    pub fn record_game(
        &mut self,
        player: impl Into<String>,
        score: u16,
        strikes: u8,
        timestamp: u64,
    ) -> Option<usize> {
        if !self.qualifies(score, strikes) {
            return None;
        }

        let entry = HighScoreEntry {
            player: player.into(),
            score,
            strikes,
            timestamp,
        };
        let pos = self
            .entries
            .iter()
            .position(|e| Self::beats(score, strikes, e))
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(pos + 1)
    }

    pub fn top_score(&self) -> Option<u16> {
        self.entries.first().map(|e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load the board from a JSON file; missing or corrupt files start fresh
    pub fn load(path: impl AsRef<Path>) -> Self {
        match fs::read_to_string(path.as_ref()) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|err| {
                log::warn!("corrupt high scores ({err}), starting fresh");
                Self::new()
            }),
            Err(_) => Self::new(),
        }
    }

    /// Save the board; failures are logged, never fatal
    pub fn save(&self, path: impl AsRef<Path>) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = fs::write(path.as_ref(), json) {
                    log::warn!("failed to save high scores: {err}");
                }
            }
            Err(err) => log::warn!("failed to serialize high scores: {err}"),
        }
    }
}
