use anyhow::{Context as AnyhowContext, Result};

use super::Workspace;
use crate::Context;
use crate::cli::ApplyArgs;
use crate::report;
use crate::ui;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let mut workspace = Workspace::load(&args.file)?;
    let plan = workspace.plan();

    if args.diff && !ctx.quiet {
        report::display_plan(&plan, ctx.verbose > 0);
    }

    if plan.is_empty() {
        ui::success("Nothing to apply");
        return Ok(());
    }

    if plan.has_destructive() && !args.yes {
        println!();
        ui::warn("This plan destroys existing instances.");
        if !confirm_proceed()? {
            ui::info("Apply cancelled");
            return Ok(());
        }
    }

    let summary = plan.summary();
    workspace
        .state
        .commit(&workspace.module, &plan, &workspace.parsed)
        .context("Failed to commit plan to state")?;
    workspace.save_state()?;

    ui::success(&format!(
        "Apply complete: {} created, {} updated, {} replaced, {} destroyed",
        summary.create, summary.update, summary.replace, summary.destroy
    ));
    if !ctx.quiet {
        ui::dim(&format!(
            "state version {} saved to {}",
            workspace.state.version,
            workspace.state_path.display()
        ));
    }
    Ok(())
}

/// Confirm with user
fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(false)
        .interact()?;

    Ok(confirmed)
}
