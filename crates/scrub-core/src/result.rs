//! Outcome of running one operation.

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Why an operation was not executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Dry-run mode: the invocation was only recorded.
    DryRun,
    /// The optional tool the operation needs is not installed.
    ToolMissing {
        /// Program that could not be found.
        tool: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DryRun => f.write_str("dry run"),
            Self::ToolMissing { tool } => write!(f, "{tool} not installed"),
        }
    }
}

/// Final status of an operation.
///
/// `Recovered` can only be produced by a failed first attempt followed by a
/// successful recovery and a successful retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// First attempt succeeded.
    Succeeded,
    /// Succeeded on the retry after a recovery strategy ran.
    Recovered {
        /// Tag of the recovery strategy (e.g. `ownership-fix`).
        via: &'static str,
    },
    /// Counted failure.
    Failed {
        /// Short reason (exit code, timeout, spawn error).
        reason: String,
    },
    /// Neither success nor failure.
    Skipped {
        /// Why the action was not invoked.
        reason: SkipReason,
    },
}

/// Result of a single [`Operation`](crate::Operation).
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Description of the operation.
    pub description: String,
    /// What happened.
    #[serde(flatten)]
    pub status: ExecutionStatus,
    /// Most recent log lines of the operation, populated on failure.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_tail: Vec<String>,
    /// Bytes released by a removal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freed_bytes: Option<u64>,
    /// Wall time spent, including recovery and retry.
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

impl ExecutionResult {
    pub(crate) fn new(description: &str, status: ExecutionStatus, elapsed: Duration) -> Self {
        Self {
            description: description.to_string(),
            status,
            output_tail: Vec::new(),
            freed_bytes: None,
            elapsed,
        }
    }

    pub(crate) fn with_freed(mut self, freed_bytes: Option<u64>) -> Self {
        self.freed_bytes = freed_bytes;
        self
    }

    pub(crate) fn with_tail(mut self, tail: Vec<String>) -> Self {
        self.output_tail = tail;
        self
    }

    /// Whether the operation ended in success, with or without recovery.
    pub fn succeeded(&self) -> bool {
        matches!(
            self.status,
            ExecutionStatus::Succeeded | ExecutionStatus::Recovered { .. }
        )
    }

    /// Whether the operation counted as a failure.
    pub fn failed(&self) -> bool {
        matches!(self.status, ExecutionStatus::Failed { .. })
    }

    /// Whether the operation was skipped.
    pub fn skipped(&self) -> bool {
        matches!(self.status, ExecutionStatus::Skipped { .. })
    }

    /// Recovery tag, set only for a success on retry.
    pub fn recovered_via(&self) -> Option<&'static str> {
        match self.status {
            ExecutionStatus::Recovered { via } => Some(via),
            _ => None,
        }
    }
}

fn as_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}
