//! CLI argument parsing via `clap`.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "copyguard",
    version,
    about = "Find and fix 'Copy always' content in project files",
    long_about = "Copyguard audits MSBuild project files for items whose CopyToOutputDirectory is 'Always' and rewrites them to 'PreserveNewest' without touching anything else.\n\nConfiguration precedence: CLI > copyguard.toml > defaults.",
    after_help = "Examples:\n  copyguard check --solution App.sln\n  copyguard check --project src/App/App.csproj\n  copyguard fix --solution App.sln\n  copyguard check --output json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Clone, Default)]
/// Options shared by `check` and `fix`.
pub struct Common {
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, help = "Solution file to read the project tree from")]
    pub solution: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::SetTrue,
        help = "Enable debug logging on stderr"
    )]
    pub verbose: bool,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current copyguard version.")]
    Version,
    /// Report offending settings
    #[command(
        about = "Report 'Copy always' items",
        long_about = "List every item set to copy on every build, grouped by project. Exits 1 when any are found.",
        after_help = "Examples:\n  copyguard check --solution App.sln\n  copyguard check --project src/App/App.csproj --output json"
    )]
    Check {
        #[command(flatten)]
        common: Common,
        #[arg(long, help = "Check only this project file instead of the whole tree")]
        project: Option<String>,
    },
    /// Rewrite offending settings in place
    #[command(
        about = "Switch 'Copy always' to 'Copy if newer'",
        long_about = "Replace the offending setting in every project file of the tree, or in one project with --project. Files without it are left untouched, byte for byte.",
        after_help = "Examples:\n  copyguard fix --solution App.sln\n  copyguard fix --project src/App/App.csproj"
    )]
    Fix {
        #[command(flatten)]
        common: Common,
        #[arg(long, help = "Fix only this project file instead of the whole tree")]
        project: Option<String>,
    },
}
