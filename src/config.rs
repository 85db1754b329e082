//! Planner tuning and per-session configuration.
//!
//! Tuning is loaded from a JSON file; every field is optional and falls back
//! to the built-in default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::Team;

/// Constants steering target selection and path costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Enemy tiles strictly closer than this to our crown count as a close threat.
    pub unsafe_distance: usize,
    /// Approximate army lost when pushing through a fogged city or mountain.
    pub fog_obstacle_cost: i64,
    /// One city is expected per this many turns.
    pub city_interval: u32,
    /// City acquisition is only considered on turns divisible by this.
    pub city_check_period: u32,
    /// A stronger biggest enemy closer than this to our crown is a threat.
    pub threat_distance: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            unsafe_distance: 7,
            fog_obstacle_cost: 50,
            city_interval: 75,
            city_check_period: 10,
            threat_distance: 15,
        }
    }
}

impl Tuning {
    /// Parse tuning from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load tuning from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json_str(&contents)?;
        Ok(tuning)
    }
}

/// Everything the turn-processing entry point needs to know up front.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Our team, including our own player index.
    pub team: Team,
    /// Planner tuning.
    pub tuning: Tuning,
}

impl SessionConfig {
    /// Default tuning for the given team.
    #[must_use]
    pub fn new(team: Team) -> Self {
        Self {
            team,
            tuning: Tuning::default(),
        }
    }
}

/// Failure loading a tuning file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid tuning JSON.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
