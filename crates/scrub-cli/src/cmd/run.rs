//! Run command: plan, confirm, execute, summarise.

use crate::config::Settings;
use crate::confirm::Confirm;
use crate::recipe;
use crate::ui::Output;
use anyhow::{Context, Result};
use scrub_core::{
    ExecutionResult, ExitDisposition, LogSink, NoRecovery, OwnershipFix, PermissionHeuristic,
    Probe, RecoveryStrategy, RunState, RunSummary, SystemExecutor, TaskRunner, plan, summarize,
};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Machine-readable report printed with `--json`.
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    disposition: ExitDisposition,
    summary: RunSummary,
    log_file: &'a Path,
    results: &'a [ExecutionResult],
}

/// Clean and reinstall the project described by `settings`.
///
/// The run log is created and the report printed even when no step
/// applies.
///
/// # Errors
///
/// Returns an error if the confirmation cannot be read, the run log cannot
/// be created, or the JSON report cannot be serialized.
pub fn run(
    settings: &Settings,
    probe: &dyn Probe,
    confirm: &dyn Confirm,
) -> Result<ExitDisposition> {
    let output = Output::new(settings.json);
    let plan = plan(recipe::steps(settings), probe);

    let mode = if settings.dry_run { " [dry run]" } else { "" };
    output.section(&format!(
        "Cleaning {} ({}){mode}",
        settings.root.display(),
        settings.package_manager
    ));
    output.plan(&plan);

    if plan.runnable_count() == 0 {
        output.info("Nothing to do.");
    } else if !confirm.confirm(&plan)? {
        output.error("Operation cancelled");
        return Ok(ExitDisposition::Cancelled);
    }

    let mut log = LogSink::create(&settings.log_file).context("Failed to create run log")?;
    log.append_line(&format!(
        "# project: {}  package manager: {}",
        settings.root.display(),
        settings.package_manager
    ))?;
    let mut state = RunState::new(log);

    let recovery: Box<dyn RecoveryStrategy> = if settings.repair {
        Box::new(OwnershipFix::new().with_elevation(settings.elevation.iter().cloned()))
    } else {
        Box::new(NoRecovery)
    };
    let executor = SystemExecutor;
    let classifier = PermissionHeuristic::new();

    output.section("Running");
    let runner = TaskRunner::new(&executor, &classifier, recovery.as_ref(), &output)
        .dry_run(settings.dry_run);
    runner.run_plan(&plan, &mut state);

    let summary = summarize(&state);
    let disposition = ExitDisposition::from_summary(&summary);
    info!(?summary, "run finished");

    if settings.json {
        let report = RunReport {
            disposition,
            summary,
            log_file: state.log().path(),
            results: state.results(),
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else {
        output.summary(&summary, state.log().path());
    }

    Ok(disposition)
}
