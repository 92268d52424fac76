//! Status lines, plan table and run summary.
//!
//! Output is written synchronously: the runner is sequential and child
//! processes write to the log file, never to the terminal.

use super::theme::{Theme, format_elapsed, format_size};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Color as CellColor, ContentArrangement, Table};
use crossterm::cursor::MoveToColumn;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use crossterm::tty::IsTty;
use scrub_core::{
    Disposition, ExecutionResult, ExecutionStatus, Operation, Plan, Reporter, RunSummary,
};
use std::cell::Cell as Flag;
use std::io::Write;
use std::path::Path;

/// Terminal reporter.
#[derive(Debug)]
pub struct Output {
    theme: Theme,
    quiet: bool,
    interactive: bool,
    line_open: Flag<bool>,
}

impl Output {
    /// Reporter for stdout. `quiet` suppresses everything (used with `--json`).
    pub fn new(quiet: bool) -> Self {
        Self {
            theme: Theme::default(),
            quiet,
            interactive: std::io::stdout().is_tty(),
            line_open: Flag::new(false),
        }
    }

    /// Prints a visual section header.
    pub fn section(&self, title: &str) {
        if self.quiet {
            return;
        }
        self.close_line();
        println!();
        println!("{}", title.bold());
    }

    /// Prints an informational message to the console.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            self.close_line();
            println!("  {} {}", self.theme.icons.info, msg);
        }
    }

    /// Prints a success message to the console.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            self.close_line();
            println!(
                "  {} {}",
                self.theme.icons.success.with(self.theme.colors.success),
                msg
            );
        }
    }

    /// Prints a warning message to the console.
    pub fn warning(&self, msg: &str) {
        if !self.quiet {
            self.close_line();
            println!(
                "  {} {}",
                self.theme.icons.warning.with(self.theme.colors.warning),
                msg.with(self.theme.colors.warning)
            );
        }
    }

    /// Prints an error message. Errors go to stderr and are never suppressed.
    pub fn error(&self, msg: &str) {
        self.close_line();
        eprintln!(
            "  {} {}",
            self.theme.icons.error.with(self.theme.colors.error),
            msg.with(self.theme.colors.error)
        );
    }

    /// Prints the plan preview.
    pub fn plan(&self, plan: &Plan) {
        if self.quiet {
            return;
        }
        println!("{}", plan_table(plan));
    }

    /// Prints the end-of-run summary.
    pub fn summary(&self, summary: &RunSummary, log_path: &Path) {
        if self.quiet {
            return;
        }
        println!();
        let skipped = if summary.skipped > 0 {
            format!(", {} skipped", summary.skipped)
        } else {
            String::new()
        };
        if summary.all_succeeded {
            self.success(&format!(
                "{} operation{} completed{}",
                summary.succeeded,
                plural(summary.succeeded),
                skipped
            ));
        } else {
            self.warning(&format!(
                "{} of {} operation{} failed{}",
                summary.failed_count,
                summary.total,
                plural(summary.total),
                skipped
            ));
        }
        if summary.recovered > 0 {
            self.info(&format!(
                "{} recovered after ownership repair",
                summary.recovered
            ));
        }
        self.info(&format!("Log: {}", log_path.display()));
    }

    fn close_line(&self) {
        if self.line_open.replace(false) {
            println!();
        }
    }

    fn status_line(&self, result: &ExecutionResult) -> String {
        let icons = &self.theme.icons;
        let colors = &self.theme.colors;
        let elapsed = format_elapsed(result.elapsed).with(colors.secondary);
        match &result.status {
            ExecutionStatus::Succeeded => {
                let freed = match result.freed_bytes {
                    Some(bytes) if bytes > 0 => format!("  {} freed", format_size(bytes)),
                    _ => String::new(),
                };
                format!(
                    "  {} {}{}  {}",
                    icons.success.with(colors.success),
                    result.description.clone().with(colors.description),
                    freed.with(colors.secondary),
                    elapsed
                )
            }
            ExecutionStatus::Recovered { via } => format!(
                "  {} {}  {}  {}",
                icons.recovered.with(colors.warning),
                result.description.clone().with(colors.description),
                format!("(recovered via {via})").with(colors.warning),
                elapsed
            ),
            ExecutionStatus::Failed { reason } => format!(
                "  {} {}  {}",
                icons.error.with(colors.error),
                result.description.clone().with(colors.description),
                format!("({reason})").with(colors.error)
            ),
            ExecutionStatus::Skipped { reason } => format!(
                "  {} {}  {}",
                icons.skipped.with(colors.skipped),
                result.description.clone().with(colors.skipped),
                format!("(skipped: {reason})").with(colors.skipped)
            ),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Reporter for Output {
    fn started(&self, op: &Operation) {
        if self.quiet || !self.interactive {
            return;
        }
        self.close_line();
        print!(
            "  {} {}",
            self.theme.icons.pending.with(self.theme.colors.secondary),
            op.description
        );
        let _ = std::io::stdout().flush();
        self.line_open.set(true);
    }

    fn recovering(&self, op: &Operation, strategy: &str) {
        if self.quiet {
            return;
        }
        self.close_line();
        println!(
            "  {} {}: permission denied, trying {}",
            self.theme.icons.warning.with(self.theme.colors.warning),
            op.description,
            strategy
        );
    }

    fn finished(&self, result: &ExecutionResult) {
        if self.quiet {
            return;
        }
        let mut stdout = std::io::stdout();
        if self.line_open.replace(false) {
            let _ = crossterm::execute!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine));
        }
        println!("{}", self.status_line(result));
        for line in &result.output_tail {
            println!(
                "      {} {}",
                "│".with(self.theme.colors.secondary),
                line.as_str().with(self.theme.colors.secondary)
            );
        }
    }
}

/// Render `plan` as a table: one row per step, skipped steps included.
pub fn plan_table(plan: &Plan) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Operation", "Command", "Status"]);

    for (i, step) in plan.steps().iter().enumerate() {
        let op = &step.operation;
        let description = if op.destructive {
            format!("{} (destructive)", op.description)
        } else {
            op.description.clone()
        };
        let status = match &step.disposition {
            Disposition::Planned => Cell::new("will run").fg(CellColor::Green),
            Disposition::NotApplicable { reason } => {
                Cell::new(format!("skip: {reason}")).fg(CellColor::DarkGrey)
            }
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(description),
            Cell::new(op.action.invocation()),
            status,
        ]);
    }
    table
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrub_core::{Guard, Operation, Probe, Step, plan};

    struct Nothing;

    impl Probe for Nothing {
        fn exists(&self, _: &Path) -> bool {
            false
        }
        fn tool_available(&self, _: &str) -> bool {
            false
        }
        fn host(&self) -> scrub_core::HostOs {
            scrub_core::HostOs::Linux
        }
    }

    #[test]
    fn test_plan_table_lists_skipped_steps() {
        let steps = vec![
            Step::new(Operation::exec("Install dependencies", "/app", "npm", ["install"])),
            Step::new(Operation::remove("Remove node_modules", "/app/node_modules"))
                .when(Guard::PathExists("/app/node_modules".into())),
        ];
        let rendered = plan_table(&plan(steps, &Nothing)).to_string();

        assert!(rendered.contains("Install dependencies"));
        assert!(rendered.contains("npm install"));
        assert!(rendered.contains("will run"));
        assert!(rendered.contains("Remove node_modules (destructive)"));
        assert!(rendered.contains("not present"));
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1), "");
        assert_eq!(plural(0), "s");
        assert_eq!(plural(3), "s");
    }
}
