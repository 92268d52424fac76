//! Process and filesystem layer behind operations.
//!
//! [`Executor`] is the seam between the task runner and the outside world.
//! [`SystemExecutor`] spawns real processes with their output appended to the
//! run log; tests substitute a scripted executor.

use crate::operation::{Action, Operation};
use crate::sink::LogSink;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// Raw result of invoking an action once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The action completed successfully.
    Success {
        /// Bytes released by a removal, when measurable.
        freed_bytes: Option<u64>,
    },
    /// The action ran and reported failure.
    Failed {
        /// Exit code, if the process exited normally.
        code: Option<i32>,
    },
    /// The action outlived its timeout and was killed.
    TimedOut(Duration),
    /// The program could not be found.
    NotFound {
        /// Program that was looked up.
        program: String,
    },
    /// The action could not be started at all.
    Error(String),
}

impl Outcome {
    /// Plain success with nothing to report.
    pub const fn success() -> Self {
        Self::Success { freed_bytes: None }
    }

    /// Whether this is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Short human reason for a non-success.
    pub fn reason(&self) -> String {
        match self {
            Self::Success { .. } => "ok".to_string(),
            Self::Failed { code: Some(code) } => format!("exit code {code}"),
            Self::Failed { code: None } => "failed".to_string(),
            Self::TimedOut(limit) => format!("timed out after {}s", limit.as_secs()),
            Self::NotFound { program } => format!("{program}: command not found"),
            Self::Error(msg) => msg.clone(),
        }
    }
}

/// Invokes an operation's action once, writing all output to the log.
pub trait Executor {
    /// Run `op.action` in `op.cwd`.
    fn execute(&self, op: &Operation, log: &mut LogSink) -> Outcome;
}

/// Real executor: spawns processes and touches the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&self, op: &Operation, log: &mut LogSink) -> Outcome {
        match &op.action {
            Action::Exec { program, args } => run_program(op, program, args, log),
            Action::RemovePath(path) => remove_path(path, log),
        }
    }
}

fn run_program(op: &Operation, program: &str, args: &[String], log: &mut LogSink) -> Outcome {
    // A missing cwd also surfaces as ENOENT from spawn; keep it apart from a
    // missing program.
    if !op.cwd.is_dir() {
        let msg = format!("working directory {} does not exist", op.cwd.display());
        log.note(&msg);
        return Outcome::Error(msg);
    }

    let (stdout, stderr) = match log.child_stdio() {
        Ok(pair) => pair,
        Err(e) => return Outcome::Error(e.to_string()),
    };

    debug!(program, ?args, cwd = %op.cwd.display(), "spawning");
    let spawned = Command::new(program)
        .args(args)
        .current_dir(&op.cwd)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr)
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log.note(&format!("{program}: command not found"));
            return Outcome::NotFound {
                program: program.to_string(),
            };
        }
        Err(e) => {
            let msg = format!("failed to spawn {program}: {e}");
            log.note(&msg);
            return Outcome::Error(msg);
        }
    };

    let waited = match op.timeout {
        Some(limit) => match child.wait_timeout(limit) {
            Ok(Some(status)) => Ok(status),
            Ok(None) => {
                warn!(program, secs = limit.as_secs(), "timed out, killing");
                let _ = child.kill();
                let _ = child.wait();
                log.note(&format!(
                    "{program}: timed out after {}s, killed",
                    limit.as_secs()
                ));
                return Outcome::TimedOut(limit);
            }
            Err(e) => Err(e),
        },
        None => child.wait(),
    };

    match waited {
        Ok(status) => exit_outcome(status),
        Err(e) => {
            let msg = format!("failed waiting for {program}: {e}");
            log.note(&msg);
            Outcome::Error(msg)
        }
    }
}

fn exit_outcome(status: ExitStatus) -> Outcome {
    if status.success() {
        Outcome::success()
    } else {
        Outcome::Failed {
            code: status.code(),
        }
    }
}

fn remove_path(path: &Path, log: &mut LogSink) -> Outcome {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log.note(&format!("{} already absent", path.display()));
            return Outcome::success();
        }
        Err(e) => {
            log.note(&format!("rm: cannot access '{}': {e}", path.display()));
            return Outcome::Failed { code: None };
        }
    };

    let freed = if meta.is_dir() {
        dir_size(path)
    } else {
        meta.len()
    };
    let removed = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    match removed {
        Ok(()) => {
            log.note(&format!("removed {} ({freed} bytes)", path.display()));
            Outcome::Success {
                freed_bytes: Some(freed),
            }
        }
        Err(e) => {
            log.note(&format!("rm: cannot remove '{}': {e}", path.display()));
            Outcome::Failed { code: None }
        }
    }
}

fn dir_size(path: &Path) -> u64 {
    walkdir::WalkDir::new(path)
        .into_iter()
        .flatten()
        .filter_map(|e| e.metadata().ok())
        .filter(std::fs::Metadata::is_file)
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sink(dir: &Path) -> LogSink {
        LogSink::create(dir.join("scrub.log")).unwrap()
    }

    #[test]
    fn test_exit_code_is_reported() {
        let dir = tempdir().unwrap();
        let mut log = sink(dir.path());
        let op = Operation::exec("fail", dir.path(), "sh", ["-c", "echo nope; exit 3"]);

        let outcome = SystemExecutor.execute(&op, &mut log);
        assert_eq!(outcome, Outcome::Failed { code: Some(3) });
        assert_eq!(log.tail(1).unwrap(), vec!["nope"]);
    }

    #[test]
    fn test_success_runs_in_operation_cwd() {
        let dir = tempdir().unwrap();
        let work = dir.path().join("android");
        std::fs::create_dir(&work).unwrap();
        let mut log = sink(dir.path());
        let op = Operation::exec("pwd", &work, "sh", ["-c", "basename \"$(pwd -P)\""]);

        assert!(SystemExecutor.execute(&op, &mut log).is_success());
        assert_eq!(log.tail(1).unwrap(), vec!["android"]);
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let dir = tempdir().unwrap();
        let mut log = sink(dir.path());
        let op = Operation::exec("ghost", dir.path(), "scrub-no-such-tool-xyz", ["--version"]);

        let outcome = SystemExecutor.execute(&op, &mut log);
        assert!(matches!(outcome, Outcome::NotFound { .. }));
        assert!(log.tail(1).unwrap()[0].contains("command not found"));
    }

    #[test]
    fn test_missing_cwd_is_an_error_not_a_missing_tool() {
        let dir = tempdir().unwrap();
        let mut log = sink(dir.path());
        let op = Operation::exec("pods", dir.path().join("ios"), "sh", ["-c", "true"]);

        assert!(matches!(
            SystemExecutor.execute(&op, &mut log),
            Outcome::Error(_)
        ));
    }

    #[test]
    fn test_timeout_kills_process() {
        let dir = tempdir().unwrap();
        let mut log = sink(dir.path());
        let op = Operation::exec("hang", dir.path(), "sleep", ["5"])
            .with_timeout(Some(Duration::from_millis(100)));

        let outcome = SystemExecutor.execute(&op, &mut log);
        assert!(matches!(outcome, Outcome::TimedOut(_)));
        assert!(log.tail(1).unwrap()[0].contains("timed out"));
    }

    #[test]
    fn test_remove_directory_reports_freed_bytes() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("node_modules");
        std::fs::create_dir_all(target.join("left-pad")).unwrap();
        std::fs::write(target.join("left-pad/index.js"), vec![b'x'; 2048]).unwrap();
        let mut log = sink(dir.path());

        let outcome = SystemExecutor.execute(&Operation::remove("rm", &target), &mut log);
        assert_eq!(
            outcome,
            Outcome::Success {
                freed_bytes: Some(2048)
            }
        );
        assert!(!target.exists());
    }

    #[test]
    fn test_remove_absent_path_is_success() {
        let dir = tempdir().unwrap();
        let mut log = sink(dir.path());
        let op = Operation::remove("rm", dir.path().join("ios/Pods"));

        assert!(SystemExecutor.execute(&op, &mut log).is_success());
        assert!(log.tail(1).unwrap()[0].contains("already absent"));
    }

    #[test]
    fn test_outcome_reasons() {
        assert_eq!(Outcome::Failed { code: Some(1) }.reason(), "exit code 1");
        assert_eq!(
            Outcome::TimedOut(Duration::from_secs(30)).reason(),
            "timed out after 30s"
        );
        assert_eq!(
            Outcome::NotFound {
                program: "pod".to_string()
            }
            .reason(),
            "pod: command not found"
        );
    }
}
