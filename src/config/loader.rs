//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (`GITHUB_TOKEN`, `TRANSPLANT_API_URL`)
//! 3. `~/.config/transplant/config.toml`
//! 4. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{CONFIG_DIR, CONFIG_FILENAME, DEFAULT_API_URL, ENV_API_URL, ENV_TOKEN};
use crate::env::Env;

/// Errors during config loading and validation. All fatal at startup,
/// before any API call is made.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(
        "no GitHub token configured: set GITHUB_TOKEN or add `token` to the \
         [github] section of the global config"
    )]
    MissingToken,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub run: RunConfig,
}

/// GitHub connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub token: Option<String>,
    pub api_url: String,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Run-shape settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Upper bound on in-flight API calls during base fetching and
    /// blob creation.
    pub max_concurrent: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { max_concurrent: 4 }
    }
}

impl Config {
    /// Load the global config file (if any) and overlay environment
    /// variables.
    pub fn load(env: &Env) -> Result<Self, ConfigError> {
        Self::load_from(global_config_path().as_deref(), env)
    }

    /// Like [`Config::load`] but with an explicit file path, so tests
    /// can point at a temp dir instead of the real home directory.
    pub fn load_from(path: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path).map_err(|source| {
                    ConfigError::ReadFile { path: path.to_path_buf(), source }
                })?;
                toml::from_str(&content).map_err(|source| ConfigError::ParseFile {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            _ => Config::default(),
        };

        if let Some(token) = env.var(ENV_TOKEN) {
            config.github.token = Some(token);
        }
        if let Some(api_url) = env.var(ENV_API_URL) {
            config.github.api_url = api_url;
        }

        Ok(config)
    }

    /// The token, or the startup error a run must fail with before any
    /// collaborator call.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.github
            .token
            .as_deref()
            .ok_or(ConfigError::MissingToken)
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILENAME))
}
