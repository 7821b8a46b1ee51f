//! Terminal output helpers

use colored::{ColoredString, Colorize};
use state::Action;

pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Indented, muted detail line
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Bold title underlined to its own width
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Plan symbol of an action, colored by how much it disturbs the instance
pub fn action_symbol(action: Action) -> ColoredString {
    let symbol = action.symbol();
    match action {
        Action::Create => symbol.green(),
        Action::Update => symbol.yellow(),
        Action::Replace => symbol.magenta(),
        Action::Destroy => symbol.red(),
        Action::NoOp => symbol.dimmed(),
    }
}

/// Attribute line of a planned change; replacement-forcing ones are flagged
pub fn attribute(line: &str, forces_replacement: bool) {
    if forces_replacement {
        println!("      {} {}", line, "# forces replacement".red());
    } else {
        println!("      {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_symbol_keeps_text() {
        assert_eq!(&*action_symbol(Action::Create), "+");
        assert_eq!(&*action_symbol(Action::Replace), Action::Replace.symbol());
        assert_eq!(&*action_symbol(Action::Destroy), "-");
    }
}
