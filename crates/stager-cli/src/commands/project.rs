//! `stager project` - copy pattern matches into a target directory.

use std::sync::Arc;

use tracing::instrument;

use stager_adapters::LocalFilesystem;
use stager_core::application::ProjectionService;

use crate::{
    cli::ProjectArgs, commands::engine_config, config::AppConfig, error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(source = %args.source.display()))]
pub fn execute(args: ProjectArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let engine = engine_config(&config.engine, &args.policy, None);
    let service = ProjectionService::new(Arc::new(LocalFilesystem::new()), &engine);

    let report = service.project(&args.source, &args.target, args.patterns.as_slice())?;

    if output.is_json() {
        return output.json(&report);
    }
    output.success(&format!(
        "Projected {} {} from {} into {}",
        report.entries,
        if report.entries == 1 { "entry" } else { "entries" },
        report.source.display(),
        report.target.display(),
    ))?;
    Ok(())
}
