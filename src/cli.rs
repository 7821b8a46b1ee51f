use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schematic")]
#[command(author = "EngineersBox")]
#[command(version)]
#[command(about = "Declarative instance configuration", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show what applying a .schm file would change
    Plan(PlanArgs),

    /// Commit the changes of a .schm file to state
    Apply(ApplyArgs),

    /// Install a bundled provider
    Install {
        /// Provider name (e.g., capsule)
        provider: String,
    },

    /// Mark an instance for recreation on the next apply
    Taint(TaintArgs),

    /// Clear an instance's taint flag
    Untaint(TaintArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct PlanArgs {
    /// Path to the .schm file
    pub file: PathBuf,

    /// Also write the plan to a file
    #[arg(long)]
    pub dtf: bool,

    /// Where --dtf writes the plan (defaults to diff_out from config)
    #[arg(long, value_name = "PATH", requires = "dtf")]
    pub diffout: Option<PathBuf>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Path to the .schm file
    pub file: PathBuf,

    /// Show the plan before applying
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub diff: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct TaintArgs {
    /// Instance name
    pub name: String,

    /// Module (.schm path) holding the instance, if more than one does
    #[arg(short, long)]
    pub module: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_apply_diff_flag() {
        let cli = Cli::try_parse_from(["schematic", "apply", "main.schm"]).unwrap();
        match cli.command {
            Command::Apply(args) => {
                assert!(args.diff);
                assert!(!args.yes);
            }
            _ => panic!("expected apply"),
        }

        let cli =
            Cli::try_parse_from(["schematic", "apply", "main.schm", "--diff=false", "-y"]).unwrap();
        match cli.command {
            Command::Apply(args) => {
                assert!(!args.diff);
                assert!(args.yes);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_diffout_requires_dtf() {
        assert!(Cli::try_parse_from(["schematic", "plan", "a.schm", "--diffout", "out"]).is_err());
        let cli =
            Cli::try_parse_from(["schematic", "plan", "a.schm", "--dtf", "--diffout", "out"])
                .unwrap();
        match cli.command {
            Command::Plan(args) => assert_eq!(args.diffout, Some(PathBuf::from("out"))),
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn test_global_verbosity() {
        let cli = Cli::try_parse_from(["schematic", "taint", "web", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
