use crate::table::SortIndicators;
use crate::utils::app_paths::AppPaths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub service: ServiceConfig,
    pub tables: TablesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for sort indicators
    pub use_glyphs: bool,

    /// Sort indicator glyphs (replaced by ASCII when use_glyphs is false)
    pub indicators: SortIndicators,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the quiz service
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// How often quiz creation polls `/quiz_progress`, in milliseconds
    pub progress_poll_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    /// Column span of the roster's empty-state row
    pub roster_empty_colspan: usize,

    /// Column span of the statistics table's empty-state row
    pub statistics_empty_colspan: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_roster_sort: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_statistics_sort: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            indicators: SortIndicators::default(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 30,
            progress_poll_ms: 500,
        }
    }
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            roster_empty_colspan: 6,
            statistics_empty_colspan: 10,
            default_roster_sort: None,
            default_statistics_sort: None,
        }
    }
}

impl Config {
    /// Load config from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        if !config.display.use_glyphs {
            config.display.indicators = SortIndicators::simple();
        }

        debug!(target: "config", "Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(AppPaths::config_dir()?.join("config.toml"))
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.service.timeout_secs)
    }

    pub fn progress_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.service.progress_poll_ms.max(1))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# quizdesk configuration file
# Location: ~/.config/quizdesk/config.toml (Linux)

[display]
# Use Unicode glyphs for sort indicators
# Set to false for ASCII-only indicators (^ v -)
use_glyphs = true

[display.indicators]
ascending = "↑"
descending = "↓"
neutral = "↕"

[service]
# Where the quiz service is running
base_url = "http://127.0.0.1:5000"

# Request timeout in seconds
timeout_secs = 30

# How often quiz creation checks progress, in milliseconds
progress_poll_ms = 500

[tables]
# Column span of the "No students yet." row
roster_empty_colspan = 6

# Column span of the "No results yet." row
statistics_empty_colspan = 10

# Column each table starts sorted by (leave commented for source order)
# default_roster_sort = "name"
# default_statistics_sort = "total"
"#
        .to_string()
    }
}
