use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub board:   BoardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub notion:  Option<NotionConfig>,
}

#[derive(Debug, Deserialize, Default)]
pub struct BoardConfig {
    /// Snapshot used when no path is given on the command line.
    pub snapshot: Option<PathBuf>,
}

fn default_level() -> String { "info".to_owned() }

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Daily rolling log files go here; stderr when unset.
    pub dir:   Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level(), dir: None }
    }
}

/// Database ids of the workspace the chores live in. The access token is
/// never stored here.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionConfig {
    pub chore_db_id:     String,
    pub chore_log_db_id: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir().join("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
        } else {
            Ok(AppConfig::default())
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chores")
}
