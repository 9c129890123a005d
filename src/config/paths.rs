// Path utilities.
// Local state and artifact locations relative to a base directory.

use std::path::PathBuf;

use directories::ProjectDirs;

pub const CONFIG_FILE: &str = "config.json";
pub const CACHE_FILE: &str = ".cache.json";
pub const HISTORY_DB: &str = "github_stats.db";
pub const BAR_CHART_FILE: &str = "github_stats_chart.svg";
pub const PIE_CHART_FILE: &str = "github_languages_pie.svg";
pub const DASHBOARD_FILE: &str = "github_stats_dashboard.html";

/// Per-user configuration directory (~/.config/ghstats on Linux).
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ghstats").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path to the per-user configuration file.
pub fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Files read and written by one invocation, all under `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    base: PathBuf,
}

impl Paths {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn config(&self) -> PathBuf {
        self.base.join(CONFIG_FILE)
    }

    /// Resolve a configured file name; absolute names are kept as given.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.base.join(name)
    }

    pub fn bar_chart(&self) -> PathBuf {
        self.base.join(BAR_CHART_FILE)
    }

    pub fn pie_chart(&self) -> PathBuf {
        self.base.join(PIE_CHART_FILE)
    }

    pub fn dashboard(&self) -> PathBuf {
        self.base.join(DASHBOARD_FILE)
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new(".")
    }
}
