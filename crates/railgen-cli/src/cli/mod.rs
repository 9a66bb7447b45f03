//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "railgen",
    bin_name = "railgen",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{1f680} Rails + React + GraphQL project generator",
    long_about = "railgen lays down a Rails API backend, a React frontend and the \
                  GraphQL wiring between them. A failed or interrupted run is \
                  rolled back, restoring whatever was there before.",
    after_help = "EXAMPLES:\n\
        \x20 railgen generate my-shop --yes\n\
        \x20 railgen g my-shop --database sqlite --no-docker --yes\n\
        \x20 railgen rollback --project-path ./my-shop --latest\n\
        \x20 railgen completions bash > /usr/share/bash-completion/completions/railgen",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a new Rails React GraphQL project.
    #[command(
        visible_alias = "g",
        about = "Generate a new project",
        after_help = "EXAMPLES:\n\
            \x20 railgen generate                       # interactive\n\
            \x20 railgen generate my-shop --yes         # all defaults\n\
            \x20 railgen generate my-shop --rails-version 7.1.0 --react-version 18.2.0 --database postgresql"
    )]
    Generate(GenerateArgs),

    /// Restore a project directory from a stored backup.
    #[command(
        about = "Roll back a project generation",
        after_help = "EXAMPLES:\n\
            \x20 railgen rollback --project-path ./my-shop --latest\n\
            \x20 railgen rollback --project-path ./my-shop --snapshot backup-2024-05-01T10-00-00-000Z"
    )]
    Rollback(RollbackArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 railgen completions bash > ~/.local/share/bash-completion/completions/railgen\n\
            \x20 railgen completions zsh  > ~/.zfunc/_railgen\n\
            \x20 railgen completions fish > ~/.config/fish/completions/railgen.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the railgen configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 railgen config get defaults.rails_version\n\
            \x20 railgen config list\n\
            \x20 railgen config path"
    )]
    Config(ConfigCommands),
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `railgen generate`.
#[derive(Debug, Default, Args)]
pub struct GenerateArgs {
    /// Project name: lowercase letters, digits and hyphens.
    #[arg(value_name = "NAME", help = "Name of the project to generate")]
    pub name: Option<String>,

    /// Skip prompts and use defaults for anything not given.
    #[arg(
        short = 'y',
        long = "yes",
        help = "Skip interactive prompts and use defaults"
    )]
    pub yes: bool,

    #[arg(long, value_name = "VERSION", help = "Rails version to use (x.y.z)")]
    pub rails_version: Option<String>,

    #[arg(long, value_name = "VERSION", help = "React version to use (x.y.z)")]
    pub react_version: Option<String>,

    #[arg(long, value_name = "TYPE", help = "Database type (postgresql, sqlite)")]
    pub database: Option<String>,

    #[arg(long, help = "Disable TypeScript support")]
    pub no_typescript: bool,

    #[arg(long, help = "Disable testing setup")]
    pub no_testing: bool,

    #[arg(long, help = "Disable linting and formatting")]
    pub no_linting: bool,

    #[arg(long, help = "Disable authentication boilerplate")]
    pub no_authentication: bool,

    #[arg(long, help = "Disable API documentation setup")]
    pub no_api_docs: bool,

    #[arg(long, help = "Skip Git repository initialization")]
    pub no_git: bool,

    #[arg(long, help = "Skip Docker configuration")]
    pub no_docker: bool,

    #[arg(long, value_name = "TOOL", help = "React build tool (vite, webpack)")]
    pub build_tool: Option<String>,

    #[arg(
        long,
        value_name = "MANAGER",
        help = "Package manager (pnpm, npm, yarn)"
    )]
    pub package_manager: Option<String>,
}

// ── rollback ──────────────────────────────────────────────────────────────────

/// Arguments for `railgen rollback`.
#[derive(Debug, Default, Args)]
pub struct RollbackArgs {
    /// Project directory to restore.
    #[arg(long, value_name = "PATH", help = "Path to the project to rollback")]
    pub project_path: Option<PathBuf>,

    /// Restore from this snapshot directory name.
    #[arg(
        long,
        value_name = "NAME",
        conflicts_with = "latest",
        help = "Snapshot to restore (see the backup directory)"
    )]
    pub snapshot: Option<String>,

    /// Restore from the newest snapshot (the default).
    #[arg(long, help = "Restore from the most recent snapshot")]
    pub latest: bool,

    #[arg(short = 'y', long = "yes", help = "Do not ask for confirmation")]
    pub yes: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `railgen completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `railgen config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.database`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_with_flags() {
        let cli = Cli::parse_from([
            "railgen",
            "generate",
            "my-shop",
            "--rails-version",
            "7.1.0",
            "--database",
            "sqlite",
            "--no-docker",
            "--no-api-docs",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected Generate command");
        };
        assert_eq!(args.name.as_deref(), Some("my-shop"));
        assert_eq!(args.rails_version.as_deref(), Some("7.1.0"));
        assert_eq!(args.database.as_deref(), Some("sqlite"));
        assert!(args.no_docker);
        assert!(args.no_api_docs);
        assert!(!args.no_git);
    }

    #[test]
    fn g_is_an_alias_for_generate() {
        let cli = Cli::parse_from(["railgen", "g", "--yes"]);
        assert!(matches!(cli.command, Commands::Generate(GenerateArgs { yes: true, .. })));
    }

    #[test]
    fn project_name_is_optional() {
        let cli = Cli::parse_from(["railgen", "generate"]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected Generate command");
        };
        assert!(args.name.is_none());
    }

    #[test]
    fn rollback_snapshot_conflicts_with_latest() {
        let result = Cli::try_parse_from([
            "railgen",
            "rollback",
            "--project-path",
            "x",
            "--snapshot",
            "backup-1",
            "--latest",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rollback_accepts_yes() {
        let cli = Cli::parse_from(["railgen", "rollback", "--project-path", "x", "-y"]);
        let Commands::Rollback(args) = cli.command else {
            panic!("expected Rollback command");
        };
        assert!(args.yes);
        assert_eq!(args.project_path, Some(PathBuf::from("x")));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["railgen", "--quiet", "--verbose", "config", "path"]);
        assert!(result.is_err());
    }
}
