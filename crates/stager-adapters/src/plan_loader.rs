//! Filesystem-based assembly plan loader.
//!
//! Reads a `stager.toml` plan and turns it into a validated domain
//! [`AssemblyPlan`] whose paths are anchored at the plan file's directory.
//!
//! # `stager.toml` format
//!
//! ```toml
//! staging = "target/staging"     # required
//! archive = "target/app.zip"     # required, outside staging
//! cleanup = false                # optional
//!
//! [[modules]]
//! name     = "ui"                # unique
//! path     = "ui/dist"           # module build output
//! target   = "ui"                # optional, defaults to name; "." = staging root
//! patterns = ["*"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use stager_core::domain::{AssemblyPlan, DomainError};

/// File name looked up when only a directory is given.
pub const DEFAULT_PLAN_FILE: &str = "stager.toml";

/// Loads assembly plans from TOML files.
pub struct PlanLoader {
    path: PathBuf,
}

impl PlanLoader {
    /// Create a loader for `path`, which may be the plan file itself or a
    /// directory holding `stager.toml`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = if path.is_dir() {
            path.join(DEFAULT_PLAN_FILE)
        } else {
            path
        };
        Self { path }
    }

    /// Plan file this loader reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, parse, anchor and validate the plan.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidPlan`] if the file is missing,
    /// unreadable or malformed, and the plan's own validation error if its
    /// content is inconsistent.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<AssemblyPlan, DomainError> {
        if !self.path.exists() {
            return Err(DomainError::InvalidPlan(format!(
                "plan file not found: {}",
                self.path.display()
            )));
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| {
            DomainError::InvalidPlan(format!("failed to read '{}': {e}", self.path.display()))
        })?;

        let plan = parse(&raw).map_err(|e| match e {
            DomainError::InvalidPlan(reason) => {
                DomainError::InvalidPlan(format!("failed to parse '{}': {reason}", self.path.display()))
            }
            other => other,
        })?;

        let base = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let plan = plan.resolve_against(base);
        plan.validate()?;

        debug!(modules = plan.modules.len(), "Loaded plan");
        Ok(plan)
    }
}

/// Parse plan TOML without touching the filesystem. Paths stay as written.
pub fn parse(raw: &str) -> Result<AssemblyPlan, DomainError> {
    toml::from_str(raw).map_err(|e| DomainError::InvalidPlan(e.message().to_string()))
}
