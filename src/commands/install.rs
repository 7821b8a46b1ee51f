use anyhow::{Result, bail};
use schema::{Provider, Schema, SchemaMap, builtin};

use crate::Context;
use crate::config::SchematicConfig;
use crate::ui;

pub fn run(ctx: &Context, provider: &str) -> Result<()> {
    let Some(found) = builtin::find(provider) else {
        let available: Vec<&str> = builtin::CATALOG.iter().map(|p| p.name).collect();
        bail!(
            "Unknown provider '{provider}'. Available: {}",
            available.join(", ")
        );
    };

    let built = found.build()?;
    let mut config = SchematicConfig::load()?;
    if !config.record_provider(found.name) {
        ui::info(&format!("Provider '{}' is already installed", found.name));
        return Ok(());
    }
    config.save()?;

    ui::success(&format!("Installed provider '{}'", found.name));
    if !ctx.quiet {
        ui::kv("Source", found.source);
        for line in kind_lines(&built, ctx.verbose > 0) {
            ui::dim(&line);
        }
    }
    Ok(())
}

/// One line per instance kind, plus its top-level fields when `fields` is set
fn kind_lines(provider: &Provider, fields: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for kind in provider.kinds() {
        let Some(instance) = provider.instance(kind) else {
            continue;
        };
        let mut line = format!("{}::{kind}", provider.name);
        if !instance.description.is_empty() {
            line.push_str(&format!(" - {}", instance.description));
        }
        lines.push(line);

        if fields && !instance.schema.is_empty() {
            lines.extend(field_lines(&instance.schema));
        }
    }
    lines
}

fn field_lines(schema: &SchemaMap) -> Vec<String> {
    schema
        .iter()
        .map(|(name, field)| {
            let mut line = format!("  {name}: {}", type_label(field));
            let flags: Vec<&str> = [
                (field.required, "required"),
                (field.computed, "computed"),
                (field.force_new, "forces replacement"),
            ]
            .into_iter()
            .filter_map(|(set, flag)| set.then_some(flag))
            .collect();
            if !flags.is_empty() {
                line.push_str(&format!(" ({})", flags.join(", ")));
            }
            if !field.description.is_empty() {
                line.push_str(&format!(" - {}", field.description));
            }
            line
        })
        .collect()
}

fn type_label(field: &Schema) -> String {
    match field.nested_fields() {
        Some(nested) => format!("{} of {} field(s)", field.ty, nested.len()),
        None => field.ty.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_lines_summary() {
        let provider = builtin::capsule().unwrap();
        assert_eq!(
            kind_lines(&provider, false),
            vec!["capsule::config - A Capsule resource instance"]
        );
    }

    #[test]
    fn test_kind_lines_with_fields() {
        let provider = builtin::capsule().unwrap();
        let lines = kind_lines(&provider, true);
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[1],
            "  config: Map of 4 field(s) (required) - Resource limits"
        );
        assert_eq!(
            lines[2],
            "  containerId: String (required, forces replacement) - Container identifier"
        );
        assert!(lines[3].starts_with("  inbuilt: Bool (required)"));
    }
}
