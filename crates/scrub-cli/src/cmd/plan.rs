//! Plan command: preview without running.

use crate::config::Settings;
use crate::recipe;
use crate::ui::Output;
use anyhow::{Context, Result};
use scrub_core::{ExitDisposition, Probe, plan};

/// Print the operations a run would perform.
///
/// # Errors
///
/// Returns an error if the JSON plan cannot be serialized.
pub fn plan_only(settings: &Settings, probe: &dyn Probe) -> Result<ExitDisposition> {
    let plan = plan(recipe::steps(settings), probe);

    if settings.json {
        let json = serde_json::to_string_pretty(&plan.entries())
            .context("Failed to serialize plan")?;
        println!("{json}");
        return Ok(ExitDisposition::Success);
    }

    let output = Output::new(false);
    output.section(&format!(
        "Plan for {} ({})",
        settings.root.display(),
        settings.package_manager
    ));
    output.plan(&plan);
    output.info(&format!(
        "{} of {} operations would run",
        plan.runnable_count(),
        plan.steps().len()
    ));
    Ok(ExitDisposition::Success)
}
