// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! High-score table and save-state files
//!
//! The high-score table is newline-delimited `name,score` text. The save
//! state is a single JSON line, `{"score": 12, "lives": 3}`. Fractional
//! numbers in a save are truncated toward zero.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EcsError, Result};

/// Entries kept when the table is saved
pub const MAX_HIGH_SCORES: usize = 10;

/// Best score per player name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighScores {
    scores: BTreeMap<String, i64>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`. A missing file is an empty table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        match fs::read_to_string(path.as_ref()) {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Parse `name,score` lines. Later lines win; malformed lines are skipped.
    pub fn parse(contents: &str) -> Self {
        let mut scores = BTreeMap::new();
        for (number, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let parsed = line
                .rsplit_once(',')
                .and_then(|(name, score)| Some((name, score.trim().parse::<i64>().ok()?)));
            match parsed {
                Some((name, score)) => {
                    scores.insert(name.to_string(), score);
                }
                None => warn!("Skipping malformed high-score line {}: {line:?}", number + 1),
            }
        }
        Self { scores }
    }

    /// Record a result, keeping the best score per name
    pub fn record(&mut self, name: &str, score: i64) {
        let best = self.scores.entry(name.to_string()).or_insert(score);
        *best = (*best).max(score);
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.scores.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Up to `n` entries, highest score first, ties by name
    pub fn top(&self, n: usize) -> Vec<(String, i64)> {
        let mut entries: Vec<(String, i64)> = self
            .scores
            .iter()
            .map(|(name, score)| (name.clone(), *score))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }

    /// Text form of the [`MAX_HIGH_SCORES`] best entries
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (name, score) in self.top(MAX_HIGH_SCORES) {
            let _ = writeln!(out, "{name},{score}");
        }
        out
    }

    /// Write the [`MAX_HIGH_SCORES`] best entries to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_text()).map_err(|e| EcsError::IoError(e.to_string()))?;
        debug!("Saved high scores to {}", path.display());
        Ok(())
    }
}

/// In-progress game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub score: i64,
    pub lives: i64,
}

/// On-disk form; either field may be missing or null
#[derive(Deserialize)]
struct StoredState {
    score: Option<serde_json::Number>,
    lives: Option<serde_json::Number>,
}

/// Whole part of a stored number; `3.0` and `3.9` both read as 3
fn whole(number: &serde_json::Number) -> Option<i64> {
    if let Some(value) = number.as_i64() {
        return Some(value);
    }
    number
        .as_f64()
        .filter(|value| value.is_finite())
        .filter(|value| value.trunc() >= i64::MIN as f64 && value.trunc() < i64::MAX as f64)
        .map(|value| value.trunc() as i64)
}

impl GameState {
    pub fn new(score: i64, lives: i64) -> Self {
        Self { score, lives }
    }

    /// Write as one JSON line
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut line = serde_json::to_string(self)
            .map_err(|e| EcsError::SerializationError(e.to_string()))?;
        line.push('\n');
        fs::write(path, line).map_err(|e| EcsError::IoError(e.to_string()))?;
        debug!("Saved game state to {}", path.display());
        Ok(())
    }

    /// Load a saved state. Anything short of a readable file holding both
    /// fields is treated as no save.
    pub fn load(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!("Could not read game state {}: {err}", path.display());
                }
                return None;
            }
        };
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Option<Self> {
        match serde_json::from_str::<StoredState>(json) {
            Ok(StoredState {
                score: Some(score),
                lives: Some(lives),
            }) => match (whole(&score), whole(&lives)) {
                (Some(score), Some(lives)) => Some(Self { score, lives }),
                _ => {
                    warn!("Game state numbers out of range: {score}, {lives}");
                    None
                }
            },
            Ok(_) => None,
            Err(err) => {
                warn!("Invalid game state: {err}");
                None
            }
        }
    }
}
