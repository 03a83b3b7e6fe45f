//! Game configuration
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```
//! use bullet_purgatory::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "starting_lives": 3 }"#).unwrap();
//! assert_eq!(config.starting_lives, 3);
//! assert_eq!(config.width, 500.0);
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EcsError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Playfield width, in pixels
    pub width: f32,
    /// Playfield height, in pixels
    pub height: f32,
    pub starting_score: i64,
    pub starting_lives: i64,
    pub player_speed: f32,
    /// Seconds between primary shots
    pub primary_cooldown: f32,
    /// Seconds between secondary shots
    pub secondary_cooldown: f32,
    /// Seconds before the pause menu can be toggled again
    pub menu_cooldown: f32,
    /// Seconds before the boss key can be toggled again
    pub boss_key_cooldown: f32,
    pub enemy_speed: f32,
    /// High-score table
    pub scores_path: PathBuf,
    /// In-progress save
    pub state_path: PathBuf,
    /// Fixed seed for spawn patterns and enemy firing; entropy if unset
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 800.0,
            starting_score: 0,
            starting_lives: 5,
            player_speed: 220.0,
            primary_cooldown: 0.15,
            secondary_cooldown: 5.0,
            menu_cooldown: 0.2,
            boss_key_cooldown: 0.2,
            enemy_speed: 130.0,
            scores_path: PathBuf::from("scores.scr"),
            state_path: PathBuf::from("state.stt"),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_json_str(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EcsError::DeserializationError(e.to_string()))
    }

    /// Length of the playfield diagonal
    pub fn diagonal(&self) -> f32 {
        self.width.hypot(self.height)
    }
}
