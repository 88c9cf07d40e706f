//! Assembly Service - main application orchestrator.
//!
//! This service runs a whole [`AssemblyPlan`]:
//! 1. Project every module into the staging directory
//! 2. Reserve the metadata directory
//! 3. Archive the staging directory
//! 4. Optionally remove the staging directory
//!
//! The first failing step aborts the run. Staging content from an aborted
//! run is left for the caller to inspect or re-project.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    application::{
        ports::{ArchiveWriter, Filesystem, output::ArchiveReport},
        services::{ArchiveService, ProjectionService},
    },
    domain::{AssemblyPlan, EngineConfig},
    error::{Context, StagerResult},
};

/// Per-module outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleReport {
    pub name: String,
    pub staging_dir: PathBuf,
    pub entries: usize,
}

/// Outcome of a full assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyReport {
    pub modules: Vec<ModuleReport>,
    pub metadata_dir: PathBuf,
    pub archive: ArchiveReport,
    pub cleaned_up: bool,
}

/// Projects, archives and cleans up according to a plan.
pub struct AssemblyService {
    filesystem: Arc<dyn Filesystem>,
    projection: ProjectionService,
    archiver: ArchiveService,
    config: EngineConfig,
}

impl AssemblyService {
    pub fn new(
        filesystem: Arc<dyn Filesystem>,
        writer: Box<dyn ArchiveWriter>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            projection: ProjectionService::new(Arc::clone(&filesystem), config),
            archiver: ArchiveService::new(Arc::clone(&filesystem), writer, config),
            filesystem,
            config: config.clone(),
        }
    }

    /// Run every step of `plan`.
    #[instrument(
        skip_all,
        fields(
            staging = %plan.staging.display(),
            archive = %plan.archive.display(),
            modules = plan.modules.len()
        )
    )]
    pub fn assemble(&self, plan: &AssemblyPlan) -> StagerResult<AssemblyReport> {
        plan.validate().context("validating plan")?;

        self.projection
            .create_directory_if_absent(&plan.staging)
            .context("preparing staging directory")?;

        let mut modules = Vec::with_capacity(plan.modules.len());
        for module in &plan.modules {
            let staging_dir = module.staging_dir(&plan.staging);
            info!(module = %module.name, "Projecting module");
            let projected = self
                .projection
                .project(&module.path, &staging_dir, module.patterns.as_slice())
                .with_context(|| format!("module '{}'", module.name))?;
            modules.push(ModuleReport {
                name: module.name.clone(),
                staging_dir,
                entries: projected.entries,
            });
        }

        let metadata_dir = plan.staging.join(&self.config.metadata_dir);
        self.projection
            .create_directory_if_absent(&metadata_dir)
            .context("reserving metadata directory")?;

        let archive = self.archiver.archive(&plan.staging, &plan.archive)?;

        let cleaned_up = plan.cleanup;
        if cleaned_up {
            self.filesystem
                .remove_dir_all(&plan.staging)
                .with_context(|| format!("cleaning up {}", plan.staging.display()))?;
            info!("Staging directory removed");
        } else {
            info!(path = %plan.staging.display(), "Staging directory kept");
        }

        Ok(AssemblyReport {
            modules,
            metadata_dir,
            archive,
            cleaned_up,
        })
    }
}
