//! Task planning.
//!
//! A [`Plan`] is built once from a list of guarded [`Step`]s and then used
//! twice: rendered as the preview, and iterated by the runner. Because the
//! runner executes exactly [`Plan::runnable`], what is previewed is what
//! runs, in the same order.

use crate::operation::Operation;
use crate::probe::{HostOs, Probe};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// A condition an operation needs in order to be applicable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// A configuration toggle; `reason` explains the skip when it is off.
    Flag {
        /// Whether the toggle allows the step.
        enabled: bool,
        /// Shown when the step is skipped.
        reason: String,
    },
    /// The path must exist.
    PathExists(PathBuf),
    /// The host must be this OS.
    HostIs(HostOs),
    /// The program must be on `PATH`.
    ToolAvailable(String),
}

impl Guard {
    /// `Ok` if the guard holds, otherwise the reason it does not.
    fn check(&self, probe: &dyn Probe) -> Result<(), String> {
        match self {
            Self::Flag { enabled: true, .. } => Ok(()),
            Self::Flag { reason, .. } => Err(reason.clone()),
            Self::PathExists(path) if probe.exists(path) => Ok(()),
            Self::PathExists(path) => Err(format!("{} not present", path.display())),
            Self::HostIs(os) if probe.host() == *os => Ok(()),
            Self::HostIs(os) => Err(format!("requires {os}")),
            Self::ToolAvailable(tool) if probe.tool_available(tool) => Ok(()),
            Self::ToolAvailable(tool) => Err(format!("{tool} not installed")),
        }
    }
}

/// An operation together with the guards deciding whether it runs.
#[derive(Debug, Clone)]
pub struct Step {
    operation: Operation,
    guards: Vec<Guard>,
}

impl Step {
    /// An unconditional step.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            guards: Vec::new(),
        }
    }

    /// Add an arbitrary guard.
    pub fn when(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// Run only if `enabled`; otherwise skip with `reason`.
    pub fn enabled(self, enabled: bool, reason: impl Into<String>) -> Self {
        self.when(Guard::Flag {
            enabled,
            reason: reason.into(),
        })
    }

    /// Run only if `path` exists.
    pub fn if_exists(self, path: impl Into<PathBuf>) -> Self {
        self.when(Guard::PathExists(path.into()))
    }

    /// Run only on `os`.
    pub fn on_host(self, os: HostOs) -> Self {
        self.when(Guard::HostIs(os))
    }

    /// Run only if `tool` is installed.
    pub fn requires_tool(self, tool: impl Into<String>) -> Self {
        self.when(Guard::ToolAvailable(tool.into()))
    }
}

/// Whether a planned step will run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum Disposition {
    /// Every guard holds; the operation will be executed.
    Planned,
    /// Some guard failed; shown in the preview, never executed.
    NotApplicable {
        /// Reason from the first failing guard.
        reason: String,
    },
}

/// An operation with its planning decision.
#[derive(Debug, Clone)]
pub struct PlannedStep {
    /// The operation the runner will execute.
    pub operation: Operation,
    /// Whether it will.
    pub disposition: Disposition,
}

/// One line of the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    /// Operation description.
    pub description: String,
    /// Whether the operation deletes state.
    pub destructive: bool,
    /// Whether it will run.
    #[serde(flatten)]
    pub disposition: Disposition,
}

/// Ordered plan for one run.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    steps: Vec<PlannedStep>,
}

impl Plan {
    /// All steps, applicable or not, in order.
    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    /// The preview.
    pub fn entries(&self) -> Vec<PlanEntry> {
        self.steps
            .iter()
            .map(|s| PlanEntry {
                description: s.operation.description.clone(),
                destructive: s.operation.destructive,
                disposition: s.disposition.clone(),
            })
            .collect()
    }

    /// Operations that will be executed, in execution order.
    pub fn runnable(&self) -> impl Iterator<Item = &Operation> {
        self.steps
            .iter()
            .filter(|s| s.disposition == Disposition::Planned)
            .map(|s| &s.operation)
    }

    /// Number of operations that will be executed.
    pub fn runnable_count(&self) -> usize {
        self.runnable().count()
    }

    /// Whether any operation that will run is destructive.
    pub fn has_destructive(&self) -> bool {
        self.runnable().any(|op| op.destructive)
    }
}

/// Evaluate every step's guards against `probe` and build the plan.
///
/// Guards are checked in the order they were added; the first one that
/// fails provides the skip reason. Nothing is executed.
pub fn plan(steps: Vec<Step>, probe: &dyn Probe) -> Plan {
    let steps = steps
        .into_iter()
        .map(|step| {
            let disposition = step
                .guards
                .iter()
                .find_map(|g| g.check(probe).err())
                .map_or(Disposition::Planned, |reason| Disposition::NotApplicable {
                    reason,
                });
            debug!(op = %step.operation.description, ?disposition, "planned");
            PlannedStep {
                operation: step.operation,
                disposition,
            }
        })
        .collect();
    Plan { steps }
}
