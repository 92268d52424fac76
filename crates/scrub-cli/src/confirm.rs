//! Confirmation before a run touches the project.

use anyhow::Result;
use crossterm::style::Stylize;
use scrub_core::Plan;
use std::io::{BufRead, Write};

/// Decides whether a previewed plan may run.
pub trait Confirm {
    /// `true` to proceed with `plan`.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn confirm(&self, plan: &Plan) -> Result<bool>;
}

/// Accepts every plan. Used for `--yes` and dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _: &Plan) -> Result<bool> {
        Ok(true)
    }
}

/// Asks on the terminal. Anything other than `y` declines, including EOF.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm {
    on_stderr: bool,
}

impl StdinConfirm {
    /// Prompt on stdout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prompt on stderr instead, keeping stdout for machine-readable output.
    pub fn on_stderr(mut self, on_stderr: bool) -> Self {
        self.on_stderr = on_stderr;
        self
    }
}

impl Confirm for StdinConfirm {
    fn confirm(&self, plan: &Plan) -> Result<bool> {
        let stdin = std::io::stdin();
        if self.on_stderr {
            ask(plan, &mut stdin.lock(), &mut std::io::stderr())
        } else {
            ask(plan, &mut stdin.lock(), &mut std::io::stdout())
        }
    }
}

fn ask(plan: &Plan, input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    let count = plan.runnable_count();
    let what = if plan.has_destructive() {
        format!("{count} operation(s) will run and delete files.")
    } else {
        format!("{count} operation(s) will run.")
    };
    writeln!(out)?;
    write!(
        out,
        "  {} {what} Continue? (y/N) ",
        "WARNING:".bold().red()
    )?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}
