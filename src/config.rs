//! Game settings, read from an optional JSON file and then overridden by
//! command-line flags.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    data::Catalog,
    map::{DEFAULT_ROOM_HEIGHT, DEFAULT_ROOM_WIDTH},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub room: RoomConfig,
    /// Fixed RNG seed for reproducible games. Random when absent.
    pub seed: Option<u64>,
    pub enemies: EnemyConfig,
    pub catalog: Catalog,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub width: i32,
    pub height: i32,
    pub level: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_ROOM_WIDTH,
            height: DEFAULT_ROOM_HEIGHT,
            level: 1,
        }
    }
}

/// How many rank-and-file enemies to scatter, inclusive on both ends, plus
/// an optional goblin pack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub min: usize,
    pub max: usize,
    pub pack: Option<PackConfig>,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            min: 1,
            max: 3,
            pack: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackConfig {
    pub count: usize,
    #[serde(default)]
    pub leader: bool,
    #[serde(default = "default_pack_radius")]
    pub radius: i32,
}

fn default_pack_radius() -> i32 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub path: PathBuf,
    /// `EnvFilter` directive, e.g. `debug` or `bitcrawler=info`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("game.log"),
            level: "debug".to_string(),
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room.width < 3 || self.room.height < 3 {
            return Err(ConfigError::Invalid(format!(
                "room must be at least 3x3, got {}x{}",
                self.room.width, self.room.height
            )));
        }
        if self.enemies.min > self.enemies.max {
            return Err(ConfigError::Invalid(format!(
                "enemy range {}..={} is empty",
                self.enemies.min, self.enemies.max
            )));
        }
        if let Some(pack) = &self.enemies.pack {
            if pack.radius < 0 {
                return Err(ConfigError::Invalid(format!(
                    "pack radius {} is negative",
                    pack.radius
                )));
            }
        }
        Ok(())
    }
}
