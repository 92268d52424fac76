//! Test doubles shared by the unit tests of this crate.

use crate::exec::{Executor, Outcome};
use crate::operation::Operation;
use crate::sink::LogSink;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Executor that records invocations and replays scripted outcomes.
///
/// Each scripted step is an outcome plus the lines "printed" by the action.
/// Once the script runs dry every call succeeds silently.
#[derive(Debug, Default)]
pub(crate) struct ScriptedExecutor {
    script: RefCell<VecDeque<(Outcome, Vec<String>)>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn then(self, outcome: Outcome, output: &[&str]) -> Self {
        self.script.borrow_mut().push_back((
            outcome,
            output.iter().map(|s| (*s).to_string()).collect(),
        ));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&self, op: &Operation, log: &mut LogSink) -> Outcome {
        self.calls.borrow_mut().push(op.action.invocation());
        let (outcome, output) = self
            .script
            .borrow_mut()
            .pop_front()
            .unwrap_or((Outcome::success(), Vec::new()));
        for line in output {
            log.append_line(&line).unwrap();
        }
        outcome
    }
}
