//! The task runner.
//!
//! Runs one operation at a time, strictly in plan order. A failure never
//! stops the run: it is classified, possibly repaired and retried once, and
//! otherwise counted. Each operation's outcome is recorded in the
//! [`RunState`].
//!
//! ```text
//! dry-run? ──yes──▶ log invocation ─▶ Skipped
//!    │no
//!    ▼
//! execute ──ok──▶ Succeeded
//!    │failed
//!    ▼
//! classify(tail) ──Other──────────────────────────▶ Failed (+1)
//!    │PermissionDenied
//!    ▼
//! recovery ──false────────────────────────────────▶ Failed (+1)
//!    │true
//!    ▼
//! execute again ──ok──▶ Recovered ──failed────────▶ Failed (+1)
//! ```

use crate::classify::{FailureClassifier, FailureKind};
use crate::exec::{Executor, Outcome};
use crate::operation::Operation;
use crate::plan::Plan;
use crate::recovery::RecoveryStrategy;
use crate::reporter::Reporter;
use crate::result::{ExecutionResult, ExecutionStatus, SkipReason};
use crate::sink::LogSink;
use crate::state::RunState;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Lines of output inspected by the classifier and shown on failure.
pub const DEFAULT_TAIL_LINES: usize = 30;

/// Executes operations with classification and one-shot recovery.
pub struct TaskRunner<'a> {
    executor: &'a dyn Executor,
    classifier: &'a dyn FailureClassifier,
    recovery: &'a dyn RecoveryStrategy,
    reporter: &'a dyn Reporter,
    dry_run: bool,
    tail_lines: usize,
}

impl std::fmt::Debug for TaskRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRunner")
            .field("recovery", &self.recovery.tag())
            .field("dry_run", &self.dry_run)
            .field("tail_lines", &self.tail_lines)
            .finish_non_exhaustive()
    }
}

impl<'a> TaskRunner<'a> {
    /// Runner with the given collaborators, not in dry-run mode.
    pub fn new(
        executor: &'a dyn Executor,
        classifier: &'a dyn FailureClassifier,
        recovery: &'a dyn RecoveryStrategy,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            executor,
            classifier,
            recovery,
            reporter,
            dry_run: false,
            tail_lines: DEFAULT_TAIL_LINES,
        }
    }

    /// Record invocations instead of performing them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Size of the output window used for classification and diagnostics.
    pub fn tail_lines(mut self, n: usize) -> Self {
        self.tail_lines = n.max(1);
        self
    }

    /// Run every runnable operation of `plan`, in order, continuing past
    /// failures.
    pub fn run_plan(&self, plan: &Plan, state: &mut RunState) -> Vec<ExecutionResult> {
        plan.runnable().map(|op| self.run(op, state)).collect()
    }

    /// Run a single operation and record its result in `state`.
    pub fn run(&self, op: &Operation, state: &mut RunState) -> ExecutionResult {
        let started = Instant::now();
        self.reporter.started(op);

        let result = self.execute(op, state.log_mut(), started);

        match &result.status {
            ExecutionStatus::Failed { reason } => {
                warn!(op = %op.description, reason = %reason, "operation failed");
            }
            status => info!(op = %op.description, ?status, "operation finished"),
        }
        self.reporter.finished(&result);
        state.record(result.clone());
        result
    }

    fn execute(&self, op: &Operation, log: &mut LogSink, started: Instant) -> ExecutionResult {
        log.note(&format!("==> {}", op.description));

        if self.dry_run {
            log.note(&format!("[dry-run] {}", op.action));
            return ExecutionResult::new(
                &op.description,
                ExecutionStatus::Skipped {
                    reason: SkipReason::DryRun,
                },
                started.elapsed(),
            );
        }

        log.note(&format!("$ {}", op.action));
        let mark = log.position().unwrap_or(0);

        let first = self.executor.execute(op, log);
        match &first {
            Outcome::Success { freed_bytes } => {
                return ExecutionResult::new(
                    &op.description,
                    ExecutionStatus::Succeeded,
                    started.elapsed(),
                )
                .with_freed(*freed_bytes);
            }
            Outcome::NotFound { program } if op.optional => {
                return ExecutionResult::new(
                    &op.description,
                    ExecutionStatus::Skipped {
                        reason: SkipReason::ToolMissing {
                            tool: program.clone(),
                        },
                    },
                    started.elapsed(),
                );
            }
            // Expired operations are failed outright: no classification, no
            // retry.
            Outcome::TimedOut(_) => {
                return self.failure(op, log, mark, first.reason(), started);
            }
            _ => {}
        }

        let tail = log.tail_since(mark, self.tail_lines).unwrap_or_default();
        let kind = self.classifier.classify(&tail);
        debug!(op = %op.description, ?kind, "classified failure");

        if kind != FailureKind::PermissionDenied {
            return self.failure(op, log, mark, first.reason(), started);
        }

        self.reporter.recovering(op, self.recovery.tag());
        if !self.recovery.attempt(kind, op, self.executor, log) {
            return self.failure(op, log, mark, first.reason(), started);
        }

        log.note(&format!("==> retrying {}", op.description));
        let second = self.executor.execute(op, log);
        if let Outcome::Success { freed_bytes } = second {
            return ExecutionResult::new(
                &op.description,
                ExecutionStatus::Recovered {
                    via: self.recovery.tag(),
                },
                started.elapsed(),
            )
            .with_freed(freed_bytes);
        }

        self.failure(op, log, mark, second.reason(), started)
    }

    fn failure(
        &self,
        op: &Operation,
        log: &LogSink,
        mark: u64,
        reason: String,
        started: Instant,
    ) -> ExecutionResult {
        let tail = log.tail_since(mark, self.tail_lines).unwrap_or_default();
        ExecutionResult::new(
            &op.description,
            ExecutionStatus::Failed { reason },
            started.elapsed(),
        )
        .with_tail(tail)
    }
}
