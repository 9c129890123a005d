// Configuration for ghstats.
// Loaded from config.json in the working directory or the user config directory.

pub mod paths;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::read_text;
use crate::error::{Result, StatsError};

pub use paths::Paths;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_max_repos: usize,
    pub default_token: Option<String>,
    pub cache_expiry_seconds: u64,
    pub cache_file: String,
    pub history_db: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_max_repos: 10,
            default_token: None,
            cache_expiry_seconds: 3600,
            cache_file: paths::CACHE_FILE.to_string(),
            history_db: paths::HISTORY_DB.to_string(),
        }
    }
}

impl Config {
    /// Load the first config file found under `paths`, then in the user config directory.
    ///
    /// Missing files fall back to defaults; a malformed file is an error.
    pub fn load(paths: &Paths) -> Result<Self> {
        let local = paths.config();
        if let Some(config) = Self::load_file(&local)? {
            return Ok(config);
        }
        if let Some(user) = paths::user_config_path() {
            if let Some(config) = Self::load_file(&user)? {
                return Ok(config);
            }
        }
        Ok(Self::default())
    }

    /// Parse one config file, or `None` if it does not exist.
    pub fn load_file(path: &Path) -> Result<Option<Self>> {
        let Some(contents) = read_text(path)? else {
            return Ok(None);
        };
        let config = serde_json::from_str(&contents)
            .map_err(|e| StatsError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded config");
        Ok(Some(config))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_seconds)
    }

    /// Configured token, ignoring empty strings.
    pub fn token(&self) -> Option<&str> {
        self.default_token.as_deref().filter(|t| !t.is_empty())
    }
}
