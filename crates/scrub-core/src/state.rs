//! Per-invocation mutable state.

use crate::result::ExecutionResult;
use crate::sink::LogSink;

/// Everything one run accumulates: the failure counter, the log handle and
/// the results in execution order.
///
/// Owned by the top-level orchestrator and mutated only by the
/// [`TaskRunner`](crate::TaskRunner). Nothing here outlives the process
/// except the log file itself.
#[derive(Debug)]
pub struct RunState {
    failed_count: usize,
    log: LogSink,
    results: Vec<ExecutionResult>,
}

impl RunState {
    /// Fresh state writing to `log`.
    pub fn new(log: LogSink) -> Self {
        Self {
            failed_count: 0,
            log,
            results: Vec::new(),
        }
    }

    /// Number of operations that ended in failure.
    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    /// Results recorded so far, in execution order.
    pub fn results(&self) -> &[ExecutionResult] {
        &self.results
    }

    /// The run log.
    pub fn log(&self) -> &LogSink {
        &self.log
    }

    pub(crate) fn log_mut(&mut self) -> &mut LogSink {
        &mut self.log
    }

    pub(crate) fn record(&mut self, result: ExecutionResult) {
        if result.failed() {
            self.failed_count += 1;
        }
        self.results.push(result);
    }
}
