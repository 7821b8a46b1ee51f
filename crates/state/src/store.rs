//! The on-disk state file

use crate::error::{Result, StateError};
use crate::plan::{Action, Plan};
use crate::record::{Capture, Data, InstanceRecord, InstanceState};
use dsl::fields::{FieldValue, assign, remove};
use dsl::ParsedState;
use schema::PATH_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// State of one `.schm` module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleState {
    pub path: String,
    #[serde(default)]
    pub instances: BTreeMap<String, InstanceState>,
    #[serde(default)]
    pub captures: BTreeMap<String, Capture>,
    #[serde(default)]
    pub data: BTreeMap<String, Data>,
}

impl ModuleState {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Self::default()
        }
    }

    fn instance(&self, name: &str) -> Result<&InstanceState> {
        self.instances
            .get(name)
            .ok_or_else(|| StateError::InstanceNotFound {
                module: self.path.clone(),
                name: name.to_string(),
            })
    }
}

/// Everything schematic has applied, per module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonSchmState {
    /// Incremented on every commit
    pub version: u64,
    #[serde(default)]
    pub modules: Vec<ModuleState>,
}

impl JsonSchmState {
    pub fn module(&self, path: &str) -> Option<&ModuleState> {
        self.modules.iter().find(|m| m.path == path)
    }

    fn module_or_err(&self, path: &str) -> Result<&ModuleState> {
        self.module(path).ok_or_else(|| StateError::ModuleNotFound {
            module: path.to_string(),
        })
    }

    fn module_entry(&mut self, path: &str) -> &mut ModuleState {
        let index = match self.modules.iter().position(|m| m.path == path) {
            Some(index) => index,
            None => {
                self.modules.push(ModuleState::new(path));
                self.modules.len() - 1
            }
        };
        &mut self.modules[index]
    }

    /// Mark an instance for recreation on the next apply
    pub fn taint(&self, module: &str, name: &str) -> Result<()> {
        self.module_or_err(module)?.instance(name)?.taint();
        log::debug!("tainted {name} in {module}");
        Ok(())
    }

    pub fn untaint(&self, module: &str, name: &str) -> Result<()> {
        self.module_or_err(module)?.instance(name)?.untaint();
        log::debug!("untainted {name} in {module}");
        Ok(())
    }

    /// Modules holding an instance with this name
    pub fn modules_with_instance(&self, name: &str) -> Vec<&str> {
        self.modules
            .iter()
            .filter(|m| m.instances.contains_key(name))
            .map(|m| m.path.as_str())
            .collect()
    }

    /// Record the result of applying `plan` to the module at `module_path`
    ///
    /// Created and replaced instances are written from their declared fields
    /// and come out clean. Updated instances keep their id, meta and any
    /// computed attributes the configuration does not set. Captures and data
    /// of the module are carried over untouched.
    ///
    /// The module is rebuilt on a copy: on error the state, version included,
    /// is left as it was.
    pub fn commit(&mut self, module_path: &str, plan: &Plan, parsed: &ParsedState) -> Result<()> {
        let mut module = self
            .module(module_path)
            .cloned()
            .unwrap_or_else(|| ModuleState::new(module_path));

        for change in &plan.changes {
            match change.action {
                Action::NoOp => {}
                Action::Destroy => {
                    module.instances.remove(&change.name);
                }
                Action::Create | Action::Replace => {
                    let instance = parsed.instances.get(&change.name).ok_or_else(|| {
                        StateError::UndeclaredInstance {
                            module: module_path.to_string(),
                            name: change.name.clone(),
                        }
                    })?;
                    let record = InstanceRecord::new(
                        &instance.name,
                        &instance.provider,
                        &instance.kind,
                        instance.fields.clone(),
                    );
                    module
                        .instances
                        .insert(change.name.clone(), InstanceState::new(record));
                }
                Action::Update => {
                    let mut record = module.instance(&change.name)?.lock();
                    for (path, attr) in &change.diff.snapshot().attributes {
                        if attr.new_computed {
                            continue;
                        }
                        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
                        if attr.new_removed {
                            remove(&mut record.attributes, &segments);
                            continue;
                        }
                        assign(
                            &mut record.attributes,
                            &segments,
                            FieldValue::scalar(attr.new.as_str()),
                        )
                        .map_err(|source| StateError::Nesting {
                            module: module_path.to_string(),
                            name: change.name.clone(),
                            source,
                        })?;
                    }
                }
            }
        }

        *self.module_entry(module_path) = module;
        self.version += 1;
        log::debug!("committed {module_path} at version {}", self.version);
        Ok(())
    }

    /// Every data record must carry an `L::` or `W::` reference
    fn check_data_references(&self) -> Result<()> {
        for module in &self.modules {
            if let Some((name, data)) = module.data.iter().find(|(_, d)| !d.has_valid_reference()) {
                return Err(StateError::InvalidDataReference {
                    module: module.path.clone(),
                    name: name.clone(),
                    reference: data.reference.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Load state from disk, or return the empty state if the file doesn't exist
pub fn load(path: &Path) -> Result<JsonSchmState> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("State file {} does not exist, using empty state", path.display());
            return Ok(JsonSchmState::default());
        }
        Err(source) => {
            return Err(StateError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let state: JsonSchmState =
        serde_json::from_str(&content).map_err(|source| StateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    state.check_data_references()?;

    log::debug!(
        "Loaded state version {} from {}",
        state.version,
        path.display()
    );
    Ok(state)
}

/// Save state to disk as pretty JSON, creating parent directories
pub fn save(path: &Path, state: &JsonSchmState) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| StateError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = serde_json::to_string_pretty(state).map_err(StateError::Serialize)?;
    fs::write(path, content).map_err(|source| StateError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("Saved state to {}", path.display());
    Ok(())
}
