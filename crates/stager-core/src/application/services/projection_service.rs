//! Projection Service - the `project` use case.
//!
//! One call projects one module: every pattern is resolved against the
//! module's source root and copied into the staging target, in order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::Filesystem,
        services::{DirectoryProjector, PatternMatcher},
    },
    domain::{EngineConfig, Pattern, path_resolver},
    error::{Context, StagerResult},
};

/// Outcome of one `project` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionReport {
    pub source: PathBuf,
    pub target: PathBuf,
    /// Patterns evaluated.
    pub patterns: usize,
    /// Matched entries copied across all patterns.
    pub entries: usize,
}

/// Projects module build output into a staging directory.
pub struct ProjectionService {
    filesystem: Arc<dyn Filesystem>,
    config: EngineConfig,
}

impl ProjectionService {
    pub fn new(filesystem: Arc<dyn Filesystem>, config: &EngineConfig) -> Self {
        Self {
            filesystem,
            config: config.clone(),
        }
    }

    /// Project `source` into `target` according to `patterns`.
    ///
    /// All patterns are parsed before anything is copied, so a malformed
    /// pattern leaves the target untouched. An empty pattern list succeeds
    /// without creating anything.
    #[instrument(
        skip_all,
        fields(
            source = %source.as_ref().display(),
            target = %target.as_ref().display(),
            patterns = patterns.len()
        )
    )]
    pub fn project<S: AsRef<str>>(
        &self,
        source: impl AsRef<Path>,
        target: impl AsRef<Path>,
        patterns: &[S],
    ) -> StagerResult<ProjectionReport> {
        let source = source.as_ref();
        let target = target.as_ref();

        let parsed = Pattern::parse_all(patterns).context("parsing patterns")?;
        let mut report = ProjectionReport {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            patterns: parsed.len(),
            entries: 0,
        };
        if parsed.is_empty() {
            info!("No patterns, nothing to project");
            return Ok(report);
        }

        if !self.filesystem.exists(source) {
            return Err(ApplicationError::SourceNotFound {
                path: source.to_path_buf(),
            })
            .with_context(|| format!("projecting {}", source.display()));
        }

        // `.` and `..` have no leaf name for a whole-tree copy to keep.
        let source = &resolve_root(source)?;

        let matcher = PatternMatcher::new(self.filesystem.as_ref());
        let projector = DirectoryProjector::new(self.filesystem.as_ref(), self.config.source_policy);

        projector
            .create_directory_if_absent(target)
            .with_context(|| format!("preparing target {}", target.display()))?;

        for pattern in &parsed {
            let set = matcher
                .resolve(source, pattern)
                .with_context(|| format!("resolving pattern '{pattern}'"))?;
            report.entries += projector
                .project(&set, target)
                .with_context(|| format!("projecting pattern '{pattern}'"))?;
        }

        info!(entries = report.entries, "Projection complete");
        Ok(report)
    }

    /// Idempotently create `path` as a directory.
    pub fn create_directory_if_absent(&self, path: impl AsRef<Path>) -> StagerResult<()> {
        let path = path.as_ref();
        DirectoryProjector::new(self.filesystem.as_ref(), self.config.source_policy)
            .create_directory_if_absent(path)
            .with_context(|| format!("creating directory {}", path.display()))
    }

    /// Create (or truncate) an empty file, creating its parents as needed.
    pub fn create_file(&self, path: impl AsRef<Path>) -> StagerResult<()> {
        let path = path.as_ref();
        DirectoryProjector::new(self.filesystem.as_ref(), self.config.source_policy)
            .create_file(path)
            .with_context(|| format!("creating file {}", path.display()))
    }
}

/// Absolute, lexically normalised form of a source root.
fn resolve_root(path: &Path) -> StagerResult<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| ApplicationError::Filesystem {
        path: path.to_path_buf(),
        reason: format!("Failed to resolve path: {e}"),
    })?;
    Ok(path_resolver::normalize(&absolute))
}
