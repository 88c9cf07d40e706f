//! Engine configuration.
//!
//! Loaded once by whoever owns configuration (the CLI) and handed to the
//! services by reference. The core keeps no global state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default name of the reserved metadata directory inside the staging tree.
pub const DEFAULT_METADATA_DIR: &str = "META-INF";

/// Settings shared by projection and archiving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How to treat a file passed where a directory was expected.
    pub source_policy: SourcePolicy,
    /// Staging subdirectory reserved for package metadata.
    pub metadata_dir: String,
    pub archive: ArchiveSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_policy: SourcePolicy::Lenient,
            metadata_dir: DEFAULT_METADATA_DIR.into(),
            archive: ArchiveSettings::default(),
        }
    }
}

/// Handling of non-directory sources in directory operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePolicy {
    /// Fall back to a single-file copy/archive.
    #[default]
    Lenient,
    /// Reject the call.
    Strict,
}

impl fmt::Display for SourcePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Archive output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    pub compression: Compression,
    /// Deflate level, 0..=9. Ignored for `Stored`.
    pub level: u8,
}

impl ArchiveSettings {
    pub const MAX_LEVEL: u8 = 9;

    /// Clamp out-of-range levels to the maximum.
    pub fn normalized(self) -> Self {
        Self {
            level: self.level.min(Self::MAX_LEVEL),
            ..self
        }
    }
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            compression: Compression::Deflated,
            level: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored => write!(f, "stored"),
            Self::Deflated => write!(f, "deflated"),
        }
    }
}
