//! Plan display

use crate::ui;
use colored::Colorize;
use state::{Action, AttrDiff, Plan, PlannedChange, Summary};
use std::fmt::Write;

const SENSITIVE: &str = "(sensitive value)";
const COMPUTED: &str = "(known after apply)";

/// Print a plan to the terminal
pub fn display_plan(plan: &Plan, show_unchanged: bool) {
    if plan.is_empty() {
        println!();
        println!("  {} No changes. State matches configuration.", "✓".green());
        return;
    }

    println!();
    for change in &plan.changes {
        if change.action == Action::NoOp && !show_unchanged {
            continue;
        }
        println!(
            "{} {} {}{}",
            ui::action_symbol(change.action),
            change.name.bold(),
            change.reference().dimmed(),
            change
                .reason
                .as_ref()
                .map(|r| format!(" ({r})").yellow().to_string())
                .unwrap_or_default()
        );
        for (path, attr) in &change.diff.snapshot().attributes {
            ui::attribute(&attribute_line(path, attr), attr.requires_new);
        }
    }

    println!();
    println!("{}", summary_line(&plan.summary()).bold());
}

/// Plain-text rendering of a plan, as written by `plan --dtf`
pub fn render_plan(plan: &Plan) -> String {
    let mut out = String::new();
    for change in plan.changes.iter().filter(|c| c.action != Action::NoOp) {
        write_change(&mut out, change);
    }
    let _ = writeln!(out, "{}", summary_line(&plan.summary()));
    out
}

fn write_change(out: &mut String, change: &PlannedChange) {
    let _ = write!(
        out,
        "{} {} {}",
        change.action.symbol(),
        change.name,
        change.reference()
    );
    if let Some(reason) = &change.reason {
        let _ = write!(out, " ({reason})");
    }
    out.push('\n');

    for (path, attr) in &change.diff.snapshot().attributes {
        let _ = write!(out, "      {}", attribute_line(path, attr));
        if attr.requires_new {
            out.push_str(" # forces replacement");
        }
        out.push('\n');
    }
}

fn attribute_line(path: &str, attr: &AttrDiff) -> String {
    let show = |value: &str| {
        if attr.sensitive {
            SENSITIVE.to_string()
        } else {
            format!("{value:?}")
        }
    };

    if attr.new_computed {
        format!("{path} = {COMPUTED}")
    } else if attr.new_removed {
        format!("{path} = {} -> null", show(&attr.old))
    } else if attr.old.is_empty() {
        format!("{path} = {}", show(&attr.new))
    } else {
        format!("{path} = {} -> {}", show(&attr.old), show(&attr.new))
    }
}

fn summary_line(summary: &Summary) -> String {
    format!(
        "Plan: {} to create, {} to update, {} to replace, {} to destroy.",
        summary.create, summary.update, summary.replace, summary.destroy
    )
}
