use anyhow::{Context as AnyhowContext, Result};
use std::fs;

use super::Workspace;
use crate::Context;
use crate::cli::PlanArgs;
use crate::report;
use crate::ui;

pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    let workspace = Workspace::load(&args.file)?;
    let plan = workspace.plan();

    if !ctx.quiet {
        ui::header(&format!("Plan for {}", args.file.display()));
        ui::kv("State", &workspace.state_path.display().to_string());
        ui::kv("Version", &workspace.state.version.to_string());
        report::display_plan(&plan, ctx.verbose > 0);
    }

    if args.dtf {
        let out = args
            .diffout
            .unwrap_or_else(|| workspace.config.diff_out_path());
        if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        fs::write(&out, report::render_plan(&plan))
            .with_context(|| format!("Failed to write plan to {}", out.display()))?;
        ui::success(&format!("Plan written to {}", out.display()));
    }

    Ok(())
}
