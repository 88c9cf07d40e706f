//! Command handlers, one module per subcommand.

pub mod archive;
pub mod assemble;
pub mod completions;
pub mod config;
pub mod init;
pub mod project;

use stager_core::domain::{Compression, EngineConfig, SourcePolicy};

use crate::cli::{CompressionArgs, CompressionMethod, PolicyArgs};

/// Layer command-line overrides on top of the loaded engine settings.
pub(crate) fn engine_config(
    base: &EngineConfig,
    policy: &PolicyArgs,
    compression: Option<&CompressionArgs>,
) -> EngineConfig {
    let mut engine = base.clone();
    if policy.strict {
        engine.source_policy = SourcePolicy::Strict;
    }
    if let Some(args) = compression {
        if let Some(method) = args.method {
            engine.archive.compression = match method {
                CompressionMethod::Stored => Compression::Stored,
                CompressionMethod::Deflated => Compression::Deflated,
            };
        }
        if let Some(level) = args.level {
            engine.archive.level = level;
        }
    }
    engine
}
