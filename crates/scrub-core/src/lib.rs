//! scrub-core - execution and recovery engine for scrub
//!
//! Runs a sequence of cleanup and reinstall operations against a mobile app
//! project, one at a time, and keeps going when one of them fails.
//!
//! # Architecture
//!
//! - **Plan**: guarded [`Step`]s are evaluated once against a read-only
//!   [`Probe`]; the resulting [`Plan`] is both the preview and the execution
//!   order.
//! - **Runner**: [`TaskRunner`] executes each runnable [`Operation`] through
//!   an [`Executor`], classifies failures from the log tail
//!   ([`FailureClassifier`]) and gives a [`RecoveryStrategy`] one chance
//!   before retrying once.
//! - **State**: [`RunState`] owns the failure counter and the [`LogSink`];
//!   [`summarize`] turns it into a [`RunSummary`].
//!
//! Nothing in this crate reads user input or keeps global state.

pub mod classify;
pub mod error;
pub mod exec;
pub mod operation;
pub mod plan;
pub mod probe;
pub mod project;
pub mod recovery;
pub mod report;
pub mod reporter;
pub mod result;
pub mod runner;
pub mod sink;
pub mod state;

#[cfg(test)]
mod testing;

pub use classify::{FailureClassifier, FailureKind, PermissionHeuristic};
pub use error::{Result, ScrubError};
pub use exec::{Executor, Outcome, SystemExecutor};
pub use operation::{Action, Operation};
pub use plan::{Disposition, Guard, Plan, PlanEntry, PlannedStep, Step, plan};
pub use probe::{HostOs, Probe, SystemProbe};
pub use project::{PROJECT_MARKER, ensure_project_root};
pub use recovery::{NoRecovery, OWNERSHIP_FIX, OwnershipFix, RecoveryStrategy};
pub use report::{ExitDisposition, RunSummary, summarize};
pub use reporter::{NullReporter, Reporter};
pub use result::{ExecutionResult, ExecutionStatus, SkipReason};
pub use runner::{DEFAULT_TAIL_LINES, TaskRunner};
pub use sink::LogSink;
pub use state::RunState;
