use crate::paths;
use anyhow::{Context, Result};
use schema::{Registry, builtin};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// `config.toml` in the schematic config directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchematicConfig {
    /// Where applied state is persisted
    pub state_file: String,
    /// Default output of `plan --dtf`
    pub diff_out: String,
    /// Providers added with `schematic install`
    pub installed_providers: Vec<String>,
}

impl Default for SchematicConfig {
    fn default() -> Self {
        Self {
            state_file: "operational/state.json".to_string(),
            diff_out: "diff_out".to_string(),
            installed_providers: Vec::new(),
        }
    }
}

impl SchematicConfig {
    /// Load config from the config directory, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Config file {} does not exist, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&paths::config_file()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        log::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// State file, honouring `SCHEMATIC_STATE_FILE`
    pub fn state_path(&self) -> PathBuf {
        paths::state_file_override().unwrap_or_else(|| paths::expand(&self.state_file))
    }

    pub fn diff_out_path(&self) -> PathBuf {
        paths::expand(&self.diff_out)
    }

    /// Record an installed provider; returns false if it was already there
    pub fn record_provider(&mut self, name: &str) -> bool {
        if self.installed_providers.iter().any(|p| p == name) {
            return false;
        }
        self.installed_providers.push(name.to_string());
        self.installed_providers.sort();
        true
    }

    /// Registry of every installed provider
    pub fn registry(&self) -> Result<Registry> {
        for name in &self.installed_providers {
            if builtin::find(name).is_none() {
                log::warn!("Installed provider '{name}' is not known to this build, ignoring");
            }
        }
        builtin::registry_for(&self.installed_providers).context("Invalid bundled provider schema")
    }
}
