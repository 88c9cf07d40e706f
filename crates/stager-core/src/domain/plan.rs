use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::pattern::Pattern;

/// What to assemble: which module outputs go where, and the final archive.
///
/// This is a thin build plan handed over by the orchestration layer, not a
/// project descriptor. Paths may be relative; [`AssemblyPlan::resolve_against`]
/// anchors them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyPlan {
    pub staging: PathBuf,
    pub archive: PathBuf,
    /// Remove the staging directory after a successful archive.
    #[serde(default)]
    pub cleanup: bool,
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

/// One module's contribution to the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub name: String,
    /// Module build output directory.
    pub path: PathBuf,
    /// Staging subdirectory; defaults to `name`. `.` means the staging root.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            target: None,
            patterns: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Where this module's content is staged.
    pub fn staging_dir(&self, staging_root: &Path) -> PathBuf {
        match self.target.as_deref() {
            None => staging_root.join(&self.name),
            Some("." | "" | "./") => staging_root.to_path_buf(),
            Some(sub) => crate::domain::path_resolver::destination(staging_root, sub),
        }
    }
}

impl AssemblyPlan {
    pub fn new(staging: impl Into<PathBuf>, archive: impl Into<PathBuf>) -> Self {
        Self {
            staging: staging.into(),
            archive: archive.into(),
            cleanup: false,
            modules: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: ModuleSpec) -> Self {
        self.modules.push(module);
        self
    }

    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Anchor every relative path in the plan at `base`.
    pub fn resolve_against(mut self, base: &Path) -> Self {
        let anchor = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        self.staging = anchor(&self.staging);
        self.archive = anchor(&self.archive);
        for module in &mut self.modules {
            module.path = anchor(&module.path);
        }
        self
    }

    /// Structural checks that need no filesystem access.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.staging.as_os_str().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "staging" });
        }
        if self.archive.as_os_str().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "archive" });
        }
        if self.archive.starts_with(&self.staging) {
            return Err(DomainError::InvalidPlan(format!(
                "archive '{}' must not be inside the staging directory '{}'",
                self.archive.display(),
                self.staging.display()
            )));
        }

        let mut seen = HashSet::new();
        for module in &self.modules {
            if module.name.trim().is_empty() {
                return Err(DomainError::MissingRequiredField {
                    field: "modules.name",
                });
            }
            if !seen.insert(module.name.as_str()) {
                return Err(DomainError::DuplicateModule {
                    name: module.name.clone(),
                });
            }
            if let Some(target) = &module.target {
                if Path::new(target).is_absolute() {
                    return Err(DomainError::InvalidPlan(format!(
                        "module '{}' target '{}' must be relative to the staging directory",
                        module.name, target
                    )));
                }
            }
            Pattern::parse_all(&module.patterns)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> AssemblyPlan {
        AssemblyPlan::new("/w/staging", "/w/out/app.zip")
            .with_module(ModuleSpec::new("ui", "/w/ui/dist").with_patterns(["*"]))
    }

    #[test]
    fn valid_plan_passes() {
        assert!(plan().validate().is_ok());
    }

    #[test]
    fn duplicate_module_rejected() {
        let p = plan().with_module(ModuleSpec::new("ui", "/w/other"));
        assert_eq!(
            p.validate(),
            Err(DomainError::DuplicateModule { name: "ui".into() })
        );
    }

    #[test]
    fn archive_inside_staging_rejected() {
        let p = AssemblyPlan::new("/w/staging", "/w/staging/app.zip");
        assert!(matches!(p.validate(), Err(DomainError::InvalidPlan(_))));
    }

    #[test]
    fn invalid_module_pattern_rejected() {
        let p = plan().with_module(ModuleSpec::new("srv", "/w/srv").with_patterns(["[a,b"]));
        assert!(matches!(
            p.validate(),
            Err(DomainError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn staging_dir_defaults_to_module_name() {
        let m = ModuleSpec::new("ui", "/w/ui");
        assert_eq!(m.staging_dir(Path::new("/s")), PathBuf::from("/s/ui"));
        let root = m.clone().with_target(".");
        assert_eq!(root.staging_dir(Path::new("/s")), PathBuf::from("/s"));
        let nested = m.with_target("web/ui");
        assert_eq!(nested.staging_dir(Path::new("/s")), PathBuf::from("/s/web/ui"));
    }

    #[test]
    fn resolve_against_anchors_relative_paths() {
        let p = AssemblyPlan::new("staging", "/abs/app.zip")
            .with_module(ModuleSpec::new("ui", "ui/dist"))
            .resolve_against(Path::new("/project"));
        assert_eq!(p.staging, PathBuf::from("/project/staging"));
        assert_eq!(p.archive, PathBuf::from("/abs/app.zip"));
        assert_eq!(p.modules[0].path, PathBuf::from("/project/ui/dist"));
    }
}
