//! Path resolution for schematic
//!
//! # Environment Variables
//!
//! - `SCHEMATIC_CONFIG_DIR` - Override config directory
//! - `SCHEMATIC_STATE_FILE` - Override the state file from config
//!
//! # Config directory priority
//!
//! 1. `SCHEMATIC_CONFIG_DIR`
//! 2. `XDG_CONFIG_HOME/schematic`
//! 3. `~/.config/schematic`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "SCHEMATIC_CONFIG_DIR";

/// Environment variable for state file override
pub const ENV_STATE_FILE: &str = "SCHEMATIC_STATE_FILE";

const APP_DIR: &str = "schematic";

/// Get the schematic config directory path
pub fn config_dir() -> Result<PathBuf> {
    resolve_config_dir(|key| std::env::var(key).ok(), dirs::home_dir())
}

/// `config.toml` inside the config directory
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// State file override from the environment, if set
pub fn state_file_override() -> Option<PathBuf> {
    std::env::var(ENV_STATE_FILE).ok().map(|path| expand(&path))
}

fn resolve_config_dir(
    env: impl Fn(&str) -> Option<String>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = env(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!("Using config dir from {ENV_CONFIG_DIR}: {}", path.display());
        return Ok(path);
    }

    if let Some(xdg_config) = env("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = home.context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Expand ~ and environment variables in a path string
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
