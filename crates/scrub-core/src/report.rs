//! End-of-run aggregation and exit disposition.

use crate::result::ExecutionResult;
use crate::state::RunState;
use serde::Serialize;

/// Counts over one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// `true` iff `failed_count == 0`.
    pub all_succeeded: bool,
    /// Operations that ended in failure.
    pub failed_count: usize,
    /// Operations that ended in success, including recovered ones.
    pub succeeded: usize,
    /// Of `succeeded`, how many needed a recovery strategy.
    pub recovered: usize,
    /// Operations skipped (dry run or missing optional tool).
    pub skipped: usize,
    /// Operations attempted or recorded.
    pub total: usize,
}

/// Aggregate `state` into a [`RunSummary`].
pub fn summarize(state: &RunState) -> RunSummary {
    let results = state.results();
    let count = |f: fn(&ExecutionResult) -> bool| results.iter().filter(|r| f(r)).count();

    RunSummary {
        all_succeeded: state.failed_count() == 0,
        failed_count: state.failed_count(),
        succeeded: count(ExecutionResult::succeeded),
        recovered: count(|r| r.recovered_via().is_some()),
        skipped: count(ExecutionResult::skipped),
        total: results.len(),
    }
}

/// How the process should end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitDisposition {
    /// Every operation succeeded or was skipped.
    Success,
    /// The run completed but some operations failed.
    CompletedWithFailures,
    /// The user declined the plan.
    Cancelled,
    /// A precondition failed; nothing was run.
    Fatal,
}

impl ExitDisposition {
    /// Disposition of a completed run.
    pub fn from_summary(summary: &RunSummary) -> Self {
        if summary.all_succeeded {
            Self::Success
        } else {
            Self::CompletedWithFailures
        }
    }

    /// Process exit code.
    ///
    /// Every operation is best-effort, so accumulated failures still exit 0
    /// (with a warning) unless `strict` is set.
    pub fn code(self, strict: bool) -> u8 {
        match self {
            Self::Success => 0,
            Self::CompletedWithFailures => u8::from(strict),
            Self::Cancelled => 1,
            Self::Fatal => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::PermissionHeuristic;
    use crate::exec::Outcome;
    use crate::operation::Operation;
    use crate::recovery::OwnershipFix;
    use crate::reporter::NullReporter;
    use crate::runner::TaskRunner;
    use crate::sink::LogSink;
    use crate::testing::ScriptedExecutor;
    use tempfile::tempdir;

    #[test]
    fn test_summary_counts() {
        let dir = tempdir().unwrap();
        let mut state = RunState::new(LogSink::create(dir.path().join("scrub.log")).unwrap());
        let exec = ScriptedExecutor::new()
            .then(Outcome::success(), &[])
            .then(Outcome::Failed { code: Some(1) }, &["Permission denied"])
            .then(Outcome::success(), &[]) // chown
            .then(Outcome::success(), &[]) // retry
            .then(Outcome::Failed { code: Some(2) }, &["boom"])
            .then(
                Outcome::NotFound {
                    program: "watchman".to_string(),
                },
                &[],
            );
        let recovery = OwnershipFix::new().for_user("dev");
        let classifier = PermissionHeuristic::new();
        let runner = TaskRunner::new(&exec, &classifier, &recovery, &NullReporter);

        let op = |name: &str| Operation::exec(name, dir.path(), name, Vec::<String>::new());
        runner.run(&op("ok"), &mut state);
        runner.run(&op("recovered"), &mut state);
        runner.run(&op("failed"), &mut state);
        runner.run(&op("watchman").optional(), &mut state);

        let summary = summarize(&state);
        assert_eq!(
            summary,
            RunSummary {
                all_succeeded: false,
                failed_count: 1,
                succeeded: 2,
                recovered: 1,
                skipped: 1,
                total: 4,
            }
        );
        assert_eq!(
            ExitDisposition::from_summary(&summary),
            ExitDisposition::CompletedWithFailures
        );
    }

    #[test]
    fn test_empty_run_is_success() {
        let dir = tempdir().unwrap();
        let state = RunState::new(LogSink::create(dir.path().join("scrub.log")).unwrap());
        let summary = summarize(&state);
        assert!(summary.all_succeeded);
        assert_eq!(ExitDisposition::from_summary(&summary), ExitDisposition::Success);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitDisposition::Success.code(true), 0);
        assert_eq!(ExitDisposition::CompletedWithFailures.code(false), 0);
        assert_eq!(ExitDisposition::CompletedWithFailures.code(true), 1);
        assert_eq!(ExitDisposition::Cancelled.code(false), 1);
        assert_eq!(ExitDisposition::Fatal.code(false), 2);
    }
}
