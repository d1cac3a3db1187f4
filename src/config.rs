use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Environment variable that overrides the database location
pub const DB_ENV: &str = "PIPELY_DB";

const TOOL_DIR: &str = ".pipely";
const DB_FILE: &str = "pipely.db";
const CONFIG_FILE: &str = "pipely.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelyConfig {
    pub database: Option<String>,
}

/// Where the database file lives, with every input to the decision held
/// explicitly rather than read from process state at resolve time.
#[derive(Debug, Clone)]
pub struct DbLocation {
    pub env_override: Option<PathBuf>,
    pub configured: Option<PathBuf>,
    pub default_path: PathBuf,
}

impl DbLocation {
    pub fn new(default_path: impl Into<PathBuf>) -> Self {
        Self {
            env_override: None,
            configured: None,
            default_path: default_path.into(),
        }
    }

    pub fn with_env_override(mut self, path: Option<PathBuf>) -> Self {
        self.env_override = path;
        self
    }

    pub fn with_configured(mut self, path: Option<PathBuf>) -> Self {
        self.configured = path;
        self
    }

    /// Build from `PIPELY_DB`, the optional config file and the home directory.
    pub fn from_env(config: Option<&PipelyConfig>) -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::HomeDirNotFound)?;
        let env_override = std::env::var_os(DB_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let configured = config
            .and_then(|c| c.database.as_deref())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(Self::new(default_database_path_in(&home))
            .with_env_override(env_override)
            .with_configured(configured))
    }

    /// Explicit argument, then env override, then config file, then default.
    pub fn resolve(&self, explicit: Option<&Path>) -> PathBuf {
        let chosen = explicit
            .map(Path::to_path_buf)
            .or_else(|| self.env_override.clone())
            .or_else(|| self.configured.clone())
            .unwrap_or_else(|| self.default_path.clone());
        expand_tilde(&chosen)
    }
}

pub fn tool_dir_in(home: &Path) -> PathBuf {
    home.join(TOOL_DIR)
}

pub fn default_database_path_in(home: &Path) -> PathBuf {
    tool_dir_in(home).join(DB_FILE)
}

pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(Error::HomeDirNotFound)?;
    Ok(tool_dir_in(&home).join(CONFIG_FILE))
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<PipelyConfig>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: PipelyConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &PipelyConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    ensure_db_dir(path)?;
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Create the parent directory of `db_path` if it is missing.
pub fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Expand a leading `~` to the home directory; other paths pass through.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
