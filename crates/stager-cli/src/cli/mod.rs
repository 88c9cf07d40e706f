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
    name    = "stager",
    bin_name = "stager",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Stage multi-module build outputs and package them as one archive",
    long_about = "Stager copies selected files out of each module's build output \
                  into a staging tree using glob patterns, then zips the tree \
                  into a single deployable archive.",
    after_help = "EXAMPLES:\n\
        \x20 stager project ui/dist target/staging/ui '*'\n\
        \x20 stager archive target/staging target/app.zip\n\
        \x20 stager assemble --plan stager.toml --cleanup\n\
        \x20 stager completions bash > /usr/share/bash-completion/completions/stager",
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
    /// Copy the entries matched by patterns into a target directory.
    #[command(
        visible_alias = "p",
        about = "Project matched entries into a directory",
        after_help = "PATTERNS:\n\
            \x20 .              the whole source tree, under the source's own name\n\
            \x20 conf/          the contents of conf, without the conf directory\n\
            \x20 bin/server     a single file, placed at the target root\n\
            \x20 deep/*/lib*    every match, flattened into the target root\n\n\
            EXAMPLES:\n\
            \x20 stager project api/build target/staging/api 'bin/*' conf/\n\
            \x20 stager project ui/dist target/staging . --strict"
    )]
    Project(ProjectArgs),

    /// Zip a directory tree.
    #[command(
        visible_alias = "a",
        about = "Archive a directory into a zip file",
        after_help = "EXAMPLES:\n\
            \x20 stager archive target/staging target/app.zip\n\
            \x20 stager archive target/staging target/app.zip --compression stored"
    )]
    Archive(ArchiveArgs),

    /// Run a whole assembly plan.
    #[command(
        about = "Assemble a package from a plan file",
        after_help = "EXAMPLES:\n\
            \x20 stager assemble                      # ./stager.toml\n\
            \x20 stager assemble --plan deploy/stager.toml --cleanup\n\
            \x20 stager assemble --dry-run"
    )]
    Assemble(AssembleArgs),

    /// Initialise a Stager configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 stager init                         # default location\n\
            \x20 stager --config ./stager-config.toml init --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stager completions bash > ~/.local/share/bash-completion/completions/stager\n\
            \x20 stager completions zsh  > ~/.zfunc/_stager\n\
            \x20 stager completions fish > ~/.config/fish/completions/stager.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Stager configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stager config get engine.source_policy\n\
            \x20 stager config list\n\
            \x20 stager config path"
    )]
    Config(ConfigCommands),
}

// ── project ───────────────────────────────────────────────────────────────────

/// Arguments for `stager project`.
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Module build output to copy from.
    #[arg(value_name = "SOURCE", help = "Source directory")]
    pub source: PathBuf,

    /// Directory receiving the matched entries; created if absent.
    #[arg(value_name = "TARGET", help = "Target directory")]
    pub target: PathBuf,

    /// Patterns, applied in order. Later patterns overwrite earlier files.
    #[arg(
        value_name = "PATTERN",
        required = true,
        num_args = 1..,
        help = "Glob patterns relative to SOURCE"
    )]
    pub patterns: Vec<String>,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

// ── archive ───────────────────────────────────────────────────────────────────

/// Arguments for `stager archive`.
#[derive(Debug, Args)]
pub struct ArchiveArgs {
    /// Directory to archive.
    #[arg(value_name = "SOURCE", help = "Directory to archive")]
    pub source: PathBuf,

    /// Zip file to write; replaced if it exists.
    #[arg(value_name = "ARCHIVE", help = "Destination zip file")]
    pub archive: PathBuf,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub compression: CompressionArgs,
}

// ── assemble ──────────────────────────────────────────────────────────────────

/// Arguments for `stager assemble`.
#[derive(Debug, Args)]
pub struct AssembleArgs {
    /// Plan file, or a directory containing `stager.toml`.
    #[arg(
        short = 'p',
        long = "plan",
        value_name = "PATH",
        default_value = ".",
        help = "Plan file or directory holding stager.toml"
    )]
    pub plan: PathBuf,

    /// Remove the staging directory after archiving, whatever the plan says.
    #[arg(long = "cleanup", help = "Remove the staging directory afterwards")]
    pub cleanup: bool,

    /// Print what would be staged without touching the filesystem.
    #[arg(long = "dry-run", help = "Show the plan without running it")]
    pub dry_run: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub compression: CompressionArgs,
}

// ── shared engine flags ───────────────────────────────────────────────────────

/// Source handling overrides.
#[derive(Debug, Args)]
pub struct PolicyArgs {
    /// Reject a file where a directory is expected instead of copying it.
    #[arg(long = "strict", help = "Reject files where a directory is expected")]
    pub strict: bool,
}

/// Archive output overrides.
#[derive(Debug, Args)]
pub struct CompressionArgs {
    /// Compression method for archive entries.
    #[arg(
        long = "compression",
        value_name = "METHOD",
        value_enum,
        help = "Entry compression method"
    )]
    pub method: Option<CompressionMethod>,

    /// Deflate level.
    #[arg(
        long = "level",
        value_name = "0-9",
        value_parser = clap::value_parser!(u8).range(0..=9),
        help = "Deflate compression level"
    )]
    pub level: Option<u8>,
}

/// Compression methods selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum CompressionMethod {
    Stored,
    Deflated,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `stager init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `stager completions`.
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

/// Subcommands for `stager config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `engine.source_policy`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_project_command() {
        let cli = Cli::parse_from(["stager", "project", "ui/dist", "out", "*", "conf/"]);
        let Commands::Project(args) = cli.command else {
            panic!("expected Project command");
        };
        assert_eq!(args.source, PathBuf::from("ui/dist"));
        assert_eq!(args.patterns, vec!["*", "conf/"]);
        assert!(!args.policy.strict);
    }

    #[test]
    fn project_requires_a_pattern() {
        let result = Cli::try_parse_from(["stager", "project", "src", "out"]);
        assert!(result.is_err());
    }

    #[test]
    fn assemble_defaults_to_current_directory() {
        let cli = Cli::parse_from(["stager", "assemble"]);
        let Commands::Assemble(args) = cli.command else {
            panic!("expected Assemble command");
        };
        assert_eq!(args.plan, PathBuf::from("."));
        assert!(!args.cleanup);
        assert!(!args.dry_run);
    }

    #[test]
    fn archive_level_out_of_range_is_rejected() {
        let result =
            Cli::try_parse_from(["stager", "archive", "staging", "app.zip", "--level", "12"]);
        assert!(result.is_err());
    }

    #[test]
    fn archive_compression_parses() {
        let cli = Cli::parse_from([
            "stager",
            "a",
            "staging",
            "app.zip",
            "--compression",
            "stored",
        ]);
        let Commands::Archive(args) = cli.command else {
            panic!("expected Archive command");
        };
        assert_eq!(args.compression.method, Some(CompressionMethod::Stored));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        // clap should reject --quiet --verbose together
        let result = Cli::try_parse_from(["stager", "--quiet", "--verbose", "config", "list"]);
        assert!(result.is_err());
    }
}
