//! Reporter trait for dependency injection
//!
//! This trait allows the runner to report progress without being coupled to
//! a specific terminal implementation.

use crate::operation::Operation;
use crate::result::ExecutionResult;

/// Receives progress events from the runner.
pub trait Reporter {
    /// An operation is about to be invoked (or recorded, in dry-run mode).
    fn started(&self, op: &Operation);

    /// A failure was classified as recoverable and a strategy is running.
    fn recovering(&self, op: &Operation, strategy: &str);

    /// An operation reached its final status.
    fn finished(&self, result: &ExecutionResult);
}

/// A no-op reporter for silent runs (e.g., testing).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn started(&self, _: &Operation) {}
    fn recovering(&self, _: &Operation, _: &str) {}
    fn finished(&self, _: &ExecutionResult) {}
}
