//! Configuration handling for zit
//!
//! Configuration is stored in `.zit/config.toml` (repository) and
//! `~/.config/zit/config.toml` (global, platform-dependent location).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ZIT_DIR;

/// Environment variable that overrides the configured author
pub const AUTHOR_ENV: &str = "ZIT_AUTHOR";

/// Fallback author when nothing else is configured
const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Repository-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RepoConfig {
    /// Commit author name
    pub author: Option<String>,

    /// How long to wait for the repository lock, in milliseconds
    pub lock_timeout_ms: u64,

    /// Extra file or directory names excluded from scans
    pub ignore: Vec<String>,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            author: None,
            lock_timeout_ms: 5000,
            ignore: vec![],
        }
    }
}

impl RepoConfig {
    /// Commented template written by `zit init`
    pub const TEMPLATE: &'static str = r#"# zit configuration

# Commit author (defaults to $ZIT_AUTHOR, the global config, then your username)
# author = "Your Name"

# Milliseconds to wait for another zit process to release the repository
lock_timeout_ms = 5000

# File or directory names never scanned, in addition to hidden entries
ignore = []
"#;
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    /// Author used by every repository without its own
    pub author: Option<String>,

    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Combined configuration (global + repository)
#[derive(Debug, Clone)]
pub struct Config {
    pub repo: RepoConfig,
    pub global: GlobalConfig,
}

impl Config {
    /// Loads configuration for a specific repository
    pub fn for_repo(root: &Path) -> Result<Self> {
        Ok(Self {
            repo: Self::load_repo_config(root)?,
            global: Self::load_global()?,
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "zit", "zit").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads repository configuration from a specific root
    pub(crate) fn load_repo_config(root: &Path) -> Result<RepoConfig> {
        let config_path = root.join(ZIT_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(RepoConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        let config: RepoConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse repository config")?;

        if config.ignore.iter().any(|name| name.contains('/')) {
            return Err(ConfigError::Invalid(
                "ignore entries are plain file or directory names, not paths".to_string(),
            )
            .into());
        }

        Ok(config)
    }

    /// Resolves the author for new commits
    ///
    /// Precedence: `ZIT_AUTHOR`, repository config, global config, then the
    /// login name of the current user.
    pub fn effective_author(&self) -> String {
        std::env::var(AUTHOR_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.repo.author.clone())
            .or_else(|| self.global.author.clone())
            .unwrap_or_else(platform_username)
    }
}

/// Login name of the current user, or "anonymous"
pub fn platform_username() -> String {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| ANONYMOUS.to_string())
}
