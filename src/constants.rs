//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and URLs so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "transplant";

/// Crate version, injected by cargo.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name under `~/.config/` for the global config file.
pub const CONFIG_DIR: &str = "transplant";

/// Global config filename inside [`CONFIG_DIR`].
pub const CONFIG_FILENAME: &str = "config.toml";

/// Default GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// User-Agent sent on every API request (GitHub rejects anonymous clients).
pub const USER_AGENT: &str = concat!("transplant/", env!("CARGO_PKG_VERSION"));


// ── Environment variable names ──────────────────────────────────────

pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_API_URL: &str = "TRANSPLANT_API_URL";
