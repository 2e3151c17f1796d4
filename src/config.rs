// File: src/config.rs
use crate::error::{DecypherError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_TALLY: &str = "default-tally.txt";
pub const DEFAULT_DICTIONARY: &str = "default-dictionary.txt";
/// Smallest tally total worth scoring text with.
pub const DEFAULT_MIN_TALLY_TOTAL: u64 = 10_000;

/// Where the engine gets its resources and how it runs. Every field may be
/// left out of a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tally: PathBuf,
    pub dictionary: PathBuf,
    pub min_tally_total: u64,
    pub parallel: bool,
    /// Bincode cache of the built index and model.
    pub snapshot: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tally: PathBuf::from(DEFAULT_TALLY),
            dictionary: PathBuf::from(DEFAULT_DICTIONARY),
            min_tally_total: DEFAULT_MIN_TALLY_TOTAL,
            parallel: false,
            snapshot: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| DecypherError::read(path, e))?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    /// Rejects tallies too small to score with.
    pub fn validate_tally(&self, total: u64) -> Result<()> {
        if total < self.min_tally_total {
            return Err(DecypherError::InsufficientTally { total, minimum: self.min_tally_total });
        }
        Ok(())
    }
}
