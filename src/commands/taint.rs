use anyhow::{Context as AnyhowContext, Result, bail};

use super::module_key;
use crate::Context;
use crate::cli::TaintArgs;
use crate::config::SchematicConfig;
use crate::ui;
use state::JsonSchmState;
use std::path::Path;

/// Set (`taint = true`) or clear an instance's taint flag
pub fn run(ctx: &Context, args: TaintArgs, taint: bool) -> Result<()> {
    let config = SchematicConfig::load()?;
    let state_path = config.state_path();
    let state = state::load(&state_path)
        .with_context(|| format!("Failed to load state from {}", state_path.display()))?;

    let module = resolve_module(&state, &args.name, args.module.as_deref())?;
    if taint {
        state.taint(&module, &args.name)?;
    } else {
        state.untaint(&module, &args.name)?;
    }
    state::save(&state_path, &state)
        .with_context(|| format!("Failed to save state to {}", state_path.display()))?;

    let verb = if taint { "tainted" } else { "untainted" };
    ui::success(&format!("Instance '{}' {verb}", args.name));
    if !ctx.quiet && taint {
        ui::dim("It will be destroyed and recreated on the next apply");
    }
    Ok(())
}

/// Pick the module holding `name`: the one given, or the only candidate
fn resolve_module(state: &JsonSchmState, name: &str, module: Option<&str>) -> Result<String> {
    if let Some(module) = module {
        return Ok(module_key(Path::new(module)));
    }

    match state.modules_with_instance(name).as_slice() {
        [] => bail!("No instance '{name}' in state"),
        [only] => Ok((*only).to_string()),
        many => bail!(
            "Instance '{name}' exists in several modules ({}); pass --module",
            many.join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use state::{InstanceRecord, InstanceState, ModuleState};

    fn state_with(modules: &[&str]) -> JsonSchmState {
        let mut state = JsonSchmState::default();
        for path in modules {
            let mut module = ModuleState::new(path);
            module.instances.insert(
                "web".to_string(),
                InstanceState::new(InstanceRecord::new("web", "capsule", "config", Default::default())),
            );
            state.modules.push(module);
        }
        state
    }

    #[test]
    fn test_single_module() {
        let state = state_with(&["/a/main.schm"]);
        assert_eq!(resolve_module(&state, "web", None).unwrap(), "/a/main.schm");
    }

    #[test]
    fn test_ambiguous_module() {
        let state = state_with(&["/a/main.schm", "/b/main.schm"]);
        let err = resolve_module(&state, "web", None).unwrap_err();
        assert!(err.to_string().contains("--module"));
    }

    #[test]
    fn test_missing_instance() {
        let state = state_with(&[]);
        assert!(resolve_module(&state, "web", None).is_err());
    }
}
