//! Recovery strategies for classified failures.
//!
//! A strategy gets exactly one attempt per failed operation and never re-runs
//! the failed action itself; the task runner decides whether to retry.
//!
//! The only strategy is [`OwnershipFix`]. It changes ownership metadata
//! outside the failed operation, with elevated privilege, so it is scoped to
//! the operation's working directory and only ever runs for
//! [`FailureKind::PermissionDenied`].

use crate::classify::FailureKind;
use crate::exec::Executor;
use crate::operation::Operation;
use crate::sink::LogSink;
use std::path::Path;
use tracing::{info, warn};

/// Tag recorded on results recovered by [`OwnershipFix`].
pub const OWNERSHIP_FIX: &str = "ownership-fix";

/// A bounded, single-shot corrective action.
pub trait RecoveryStrategy {
    /// Tag recorded in [`ExecutionStatus::Recovered`](crate::ExecutionStatus::Recovered).
    fn tag(&self) -> &'static str;

    /// Try to repair the cause of `failed`'s failure. Returns `true` if the
    /// repair itself succeeded and a retry is worthwhile.
    fn attempt(
        &self,
        kind: FailureKind,
        failed: &Operation,
        executor: &dyn Executor,
        log: &mut LogSink,
    ) -> bool;
}

/// Recursively hands the failing operation's directory back to the invoking
/// user (`sudo chown -R <user> <cwd>`).
#[derive(Debug, Clone)]
pub struct OwnershipFix {
    elevation: Vec<String>,
    user: Option<String>,
}

impl OwnershipFix {
    /// Elevate with `sudo`, chown to the user from `$USER` (or `$LOGNAME`).
    pub fn new() -> Self {
        Self {
            elevation: vec!["sudo".to_string()],
            user: current_user(),
        }
    }

    /// Replace the elevation prefix (e.g. `["doas"]`, or empty to run
    /// `chown` directly).
    pub fn with_elevation<I, S>(mut self, prefix: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elevation = prefix.into_iter().map(Into::into).collect();
        self
    }

    /// Chown to `user` instead of the detected one.
    pub fn for_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// The repair operation for `scope`, or `None` if no user is known.
    pub fn repair_operation(&self, scope: &Path) -> Option<Operation> {
        let user = self.user.as_deref()?;
        let mut argv: Vec<String> = self.elevation.clone();
        argv.extend([
            "chown".to_string(),
            "-R".to_string(),
            user.to_string(),
            scope.display().to_string(),
        ]);
        let program = argv.remove(0);
        Some(Operation::exec(
            format!("Repair ownership of {}", scope.display()),
            scope,
            program,
            argv,
        ))
    }
}

impl Default for OwnershipFix {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveryStrategy for OwnershipFix {
    fn tag(&self) -> &'static str {
        OWNERSHIP_FIX
    }

    fn attempt(
        &self,
        kind: FailureKind,
        failed: &Operation,
        executor: &dyn Executor,
        log: &mut LogSink,
    ) -> bool {
        if kind != FailureKind::PermissionDenied {
            return false;
        }

        let Some(repair) = self.repair_operation(&failed.cwd) else {
            warn!(op = %failed.description, "cannot determine invoking user, skipping ownership fix");
            log.note("ownership fix skipped: invoking user unknown");
            return false;
        };

        log.note(&format!("==> {}", repair.description));
        log.note(&format!("$ {}", repair.action));
        let outcome = executor.execute(&repair, log);
        info!(op = %failed.description, ok = outcome.is_success(), "ownership fix attempted");
        outcome.is_success()
    }
}

/// Strategy that never recovers. Used when repair is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRecovery;

impl RecoveryStrategy for NoRecovery {
    fn tag(&self) -> &'static str {
        "none"
    }

    fn attempt(&self, _: FailureKind, _: &Operation, _: &dyn Executor, _: &mut LogSink) -> bool {
        false
    }
}

fn current_user() -> Option<String> {
    ["USER", "LOGNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok())
        .filter(|u| !u.is_empty())
}
