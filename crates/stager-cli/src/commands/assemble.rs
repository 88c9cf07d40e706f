//! `stager assemble` - run a `stager.toml` plan end to end.

use std::sync::Arc;

use tracing::{debug, instrument};

use stager_adapters::{LocalFilesystem, PlanLoader, ZipArchiver};
use stager_core::{
    application::{AssemblyReport, AssemblyService},
    domain::{AssemblyPlan, EngineConfig},
};

use crate::{
    cli::AssembleArgs,
    commands::engine_config,
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

#[instrument(skip_all, fields(plan = %args.plan.display()))]
pub fn execute(args: AssembleArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let loader = PlanLoader::new(&args.plan);
    let mut plan = loader.load()?;
    plan.cleanup |= args.cleanup;
    debug!(path = %loader.path().display(), modules = plan.modules.len(), "Plan loaded");

    let engine = engine_config(&config.engine, &args.policy, Some(&args.compression));

    if args.dry_run {
        return dry_run(&plan, &engine, &output);
    }

    let report = AssemblyService::new(
        Arc::new(LocalFilesystem::new()),
        Box::new(ZipArchiver::new()),
        &engine,
    )
    .assemble(&plan)
    .with_cli_context(|| format!("assembling {}", loader.path().display()))?;

    if output.is_json() {
        return output.json(&report);
    }
    summarize(&report, &output)
}

fn summarize(report: &AssemblyReport, output: &OutputManager) -> CliResult<()> {
    for module in &report.modules {
        output.info(&format!(
            "{}: {} entries -> {}",
            module.name,
            module.entries,
            module.staging_dir.display()
        ))?;
    }
    output.success(&format!(
        "Assembled {} ({} records)",
        report.archive.path.display(),
        report.archive.entries
    ))?;
    if report.cleaned_up {
        output.print("Staging directory removed")?;
    }
    Ok(())
}

fn dry_run(plan: &AssemblyPlan, engine: &EngineConfig, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        return output.json(plan);
    }

    output.header("Dry run: nothing will be written")?;
    output.print(&format!("Staging: {}", plan.staging.display()))?;
    for module in &plan.modules {
        output.print(&format!(
            "  {} ({}) -> {}",
            module.name,
            module.path.display(),
            module.staging_dir(&plan.staging).display()
        ))?;
        for pattern in &module.patterns {
            output.print(&format!("      {pattern}"))?;
        }
    }
    output.print(&format!(
        "Metadata: {}",
        plan.staging.join(&engine.metadata_dir).display()
    ))?;
    output.print(&format!(
        "Archive: {} ({}, level {})",
        plan.archive.display(),
        engine.archive.compression,
        engine.archive.normalized().level
    ))?;
    if plan.cleanup {
        output.print("Staging directory would be removed afterwards")?;
    }
    Ok(())
}
