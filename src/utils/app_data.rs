use crate::index::types::BuildConfig;
use crate::query::executor::MatchMode;
use crate::query::scorer::ScoringWeights;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "docdex";
const CONFIG_FILE: &str = "config.json";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Maximum number of results shown per query
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Whether every query term must match (`all`) or any of them (`any`)
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Weights used to rank search results
    #[serde(default)]
    pub scoring: ScoringWeights,

    /// Settings for `docdex build`
    #[serde(default)]
    pub build: BuildConfig,
}

fn default_limit() -> usize {
    50
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            match_mode: MatchMode::default(),
            scoring: ScoringWeights::default(),
            build: BuildConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load config from an explicit path, or from the app data directory.
    /// A missing file yields the defaults; an unreadable one is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match get_config_path() {
                Ok(path) => path,
                Err(e) => {
                    tracing::debug!("no app data directory, using default config: {e:#}");
                    return Ok(Self::default());
                }
            },
        };

        if !config_path.exists() {
            if explicit.is_some() {
                anyhow::bail!("Config file not found: {}", config_path.display());
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    /// Save config to the app data directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    Ok(base.join(APP_NAME))
}
