//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only ever sees the
//! [`EngineConfig`] part, by reference.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (applied at the call-site, not here)
//! 2. Environment variables: `STAGER_ENGINE__SOURCE_POLICY=strict`
//! 3. Config file (TOML)
//! 4. Built-in defaults (always present)

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use stager_core::domain::EngineConfig;

use crate::error::{CliError, CliResult};

/// Prefix for environment overrides. Nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "STAGER";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Projection and archiving settings handed to the core.
    pub engine: EngineConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration, starting from defaults.
    ///
    /// `config_file` is the path passed via `--config`. With `require_file`
    /// an explicit file must exist; the default location is always optional.
    pub fn load(config_file: Option<&PathBuf>, require_file: bool) -> CliResult<Self> {
        let path = Self::active_path(config_file);

        let settings = Config::builder()
            .add_source(Config::try_from(&Self::default()).map_err(config_error)?)
            .add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(require_file && config_file.is_some()),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_error)?;

        settings.try_deserialize().map_err(config_error)
    }

    /// The file [`Self::load`] reads: `--config` if given, else the default.
    pub fn active_path(config_file: Option<&PathBuf>) -> PathBuf {
        config_file.cloned().unwrap_or_else(Self::config_path)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.stager.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "stager", "stager")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".stager.toml"))
    }

    /// Serialise as the TOML written by `stager init`.
    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

fn config_error(err: config::ConfigError) -> CliError {
    CliError::ConfigError {
        message: err.to_string(),
        source: Some(Box::new(err)),
    }
}
