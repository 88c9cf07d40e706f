//! `stager archive` - zip a directory tree.

use std::sync::Arc;

use tracing::instrument;

use stager_adapters::{LocalFilesystem, ZipArchiver};
use stager_core::application::ArchiveService;

use crate::{
    cli::ArchiveArgs, commands::engine_config, config::AppConfig, error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(source = %args.source.display()))]
pub fn execute(args: ArchiveArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let engine = engine_config(&config.engine, &args.policy, Some(&args.compression));
    let service = ArchiveService::new(
        Arc::new(LocalFilesystem::new()),
        Box::new(ZipArchiver::new()),
        &engine,
    );

    let report = service.archive(&args.source, &args.archive)?;

    if output.is_json() {
        return output.json(&report);
    }
    output.success(&format!(
        "Wrote {} ({} records, {})",
        report.path.display(),
        report.entries,
        engine.archive.compression,
    ))?;
    Ok(())
}
