//! Flags shared by every `stager` subcommand.
//!
//! Flattened into [`super::Cli`] and marked `global`, so they may appear
//! before or after the subcommand name.

use clap::Args;
use std::path::PathBuf;

/// Logging, colour, config and report-format switches.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Log level, raised once per repetition. `RUST_LOG` takes precedence.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Log more detail about staging (-v, -vv, -vvv)",
        long_help = "Log more detail about staging to stderr:
    (none)  - Warnings and errors
    -v      - Info level (per-module progress)
    -vv     - Debug level (every resolved pattern)
    -vvv    - Trace level (every copied entry)
RUST_LOG, when set, overrides this flag."
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Print only errors and JSON reports"
    )]
    pub quiet: bool,

    /// Plain messages and logs. Also set by the `NO_COLOR` variable or
    /// `output.no_color` in the config file.
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        help = "Disable colored messages and logs"
    )]
    pub no_color: bool,

    /// Overrides the per-user `config.toml`. `STAGER_*` variables still
    /// apply on top of it.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "Read engine settings from FILE",
        long_help = "Read engine settings from FILE instead of the per-user config.toml.
The file must exist, except for `stager init`, which creates it.
STAGER_* environment variables (e.g. STAGER_ENGINE__SOURCE_POLICY=strict)
override values from the file."
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "output-format",
        global = true,
        value_enum,
        default_value = "auto",
        help = "How reports are printed"
    )]
    pub output_format: OutputFormat,
}

/// Rendering of command reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Colored when stdout is a terminal.
    #[default]
    Auto,
    /// Colored summary lines.
    Human,
    /// Summary lines without ANSI codes.
    Plain,
    /// One JSON report on stdout, JSON logs on stderr.
    Json,
}
