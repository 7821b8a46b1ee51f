//! Command implementations

pub mod apply;
pub mod install;
pub mod plan;
pub mod taint;

use crate::config::SchematicConfig;
use anyhow::{Context, Result, bail};
use dsl::ParsedState;
use schema::Registry;
use state::{JsonSchmState, Plan};
use std::path::{Path, PathBuf};

/// Extension every declaration file must carry
pub const SCHEMATIC_EXTENSION: &str = "schm";

/// A parsed `.schm` file alongside the state it is planned against
pub struct Workspace {
    pub config: SchematicConfig,
    pub state_path: PathBuf,
    pub state: JsonSchmState,
    /// Key of this file's module in state
    pub module: String,
    pub parsed: ParsedState,
    registry: Registry,
}

impl Workspace {
    pub fn load(file: &Path) -> Result<Self> {
        check_extension(file)?;

        let config = SchematicConfig::load()?;
        let registry = config.registry()?;
        if registry.names().next().is_none() {
            log::warn!("No providers installed; try `schematic install capsule`");
        }

        let parsed = dsl::parse_file(file, &registry)
            .with_context(|| format!("Failed to parse {}", file.display()))?;
        if parsed.is_empty() {
            log::warn!(
                "{} declares nothing; every instance in its module is planned for destruction",
                file.display()
            );
        }

        let state_path = config.state_path();
        let state = state::load(&state_path)
            .with_context(|| format!("Failed to load state from {}", state_path.display()))?;

        Ok(Self {
            module: module_key(file),
            config,
            state_path,
            state,
            parsed,
            registry,
        })
    }

    pub fn plan(&self) -> Plan {
        state::plan(
            self.state.module(&self.module),
            &self.parsed,
            &self.registry,
        )
    }

    pub fn save_state(&self) -> Result<()> {
        state::save(&self.state_path, &self.state)
            .with_context(|| format!("Failed to save state to {}", self.state_path.display()))
    }
}

/// Reject anything that isn't a `.schm` file
pub fn check_extension(file: &Path) -> Result<()> {
    match file.extension().and_then(|e| e.to_str()) {
        Some(SCHEMATIC_EXTENSION) => Ok(()),
        Some(other) => bail!(
            "schematic file path is not of a valid file type. Expected: .{SCHEMATIC_EXTENSION}, Got: .{other}"
        ),
        None => bail!(
            "schematic file path has no extension. Expected: .{SCHEMATIC_EXTENSION}"
        ),
    }
}

/// Modules are keyed by the canonical path of their file when it exists
pub fn module_key(file: &Path) -> String {
    std::fs::canonicalize(file)
        .unwrap_or_else(|_| file.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_check_extension() {
        assert!(check_extension(Path::new("main.schm")).is_ok());
        let err = check_extension(Path::new("main.tf")).unwrap_err();
        assert!(err.to_string().contains("Got: .tf"));
        assert!(check_extension(Path::new("main")).is_err());
    }

    #[test]
    fn test_module_key_is_canonical() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("main.schm");
        std::fs::write(&file, "").unwrap();
        let dotted = temp.path().join(".").join("main.schm");
        assert_eq!(module_key(&dotted), module_key(&file));
    }

    #[test]
    fn test_module_key_missing_file() {
        assert_eq!(module_key(Path::new("nowhere/main.schm")), "nowhere/main.schm");
    }
}
