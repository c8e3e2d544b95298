use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use pws_core::{SourceDescriptor, UnitPreferences};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A configured station: display name plus the URL its data is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    pub name: String,
    pub url: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [units]
    /// temperature = "°C"
    /// wind_speed = "km/h"
    #[serde(default)]
    pub units: UnitPreferences,

    /// Example TOML:
    /// [[stations]]
    /// name = "Home"
    /// url = "http://example.com/clientraw.txt"
    #[serde(default)]
    pub stations: Vec<StationConfig>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "pws-watcher", "pws")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Add a station, replacing any existing one with the same name.
    pub fn upsert_station(&mut self, name: String, url: String) {
        match self.stations.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.url = url,
            None => self.stations.push(StationConfig { name, url }),
        }
    }

    /// Returns whether a station with that name existed.
    pub fn remove_station(&mut self, name: &str) -> bool {
        let before = self.stations.len();
        self.stations.retain(|s| s.name != name);
        self.stations.len() != before
    }

    pub fn station(&self, name: &str) -> Option<&StationConfig> {
        self.stations.iter().find(|s| s.name == name)
    }

    /// Every configured station as a source descriptor.
    pub fn sources(&self) -> Vec<SourceDescriptor> {
        self.stations
            .iter()
            .map(|s| SourceDescriptor::new(s.name.clone(), s.url.clone()))
            .collect()
    }

    /// Sources to show: the named station only, or all of them.
    pub fn selected_sources(&self, name: Option<&str>) -> Result<Vec<SourceDescriptor>> {
        if self.stations.is_empty() {
            return Err(anyhow!(
                "No stations configured.\n\
                 Hint: run `pws station add <name> <url>` first."
            ));
        }

        match name {
            None => Ok(self.sources()),
            Some(name) => {
                let station = self.station(name).ok_or_else(|| {
                    anyhow!("Unknown station '{name}'.\nHint: run `pws station list`.")
                })?;
                Ok(vec![SourceDescriptor::new(
                    station.name.clone(),
                    station.url.clone(),
                )])
            }
        }
    }
}
