use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

pub struct AppPaths;

impl AppPaths {
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?
            .join("quizdesk");

        Ok(config_dir)
    }

    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Cannot determine data directory"))?
            .join("quizdesk");

        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    /// Roster file the binary falls back to when no file is given
    pub fn default_roster_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("students.json"))
    }
}
