//! Operations: the named, independently executable steps of a run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What an operation does when invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run an external program with arguments.
    Exec {
        /// Program name or path, resolved through `PATH`.
        program: String,
        /// Arguments passed verbatim (no shell).
        args: Vec<String>,
    },
    /// Recursively remove a file or directory. An absent path is a success.
    RemovePath(PathBuf),
}

impl Action {
    /// Shorthand for [`Action::Exec`].
    pub fn exec<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exec {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The invocation as it would be typed in a shell, for logs and dry runs.
    pub fn invocation(&self) -> String {
        match self {
            Self::Exec { program, args } if args.is_empty() => program.clone(),
            Self::Exec { program, args } => format!("{program} {}", args.join(" ")),
            Self::RemovePath(path) => format!("rm -rf {}", path.display()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.invocation())
    }
}

/// A single unit of work.
///
/// Operations carry their own working directory so that no step depends on
/// a directory change made by an earlier one.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Human label used in the plan, the log and the summary.
    pub description: String,
    /// The side effect itself.
    pub action: Action,
    /// Whether the action deletes user-visible state.
    pub destructive: bool,
    /// Working directory the action runs in.
    pub cwd: PathBuf,
    /// Kill the action and count it as failed after this long.
    pub timeout: Option<Duration>,
    /// The program is an optional tool: if it is not installed the operation
    /// is skipped instead of failing.
    pub optional: bool,
}

impl Operation {
    /// An operation running `program args...` in `cwd`.
    pub fn exec<I, S>(
        description: impl Into<String>,
        cwd: impl Into<PathBuf>,
        program: impl Into<String>,
        args: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            description: description.into(),
            action: Action::exec(program, args),
            destructive: false,
            cwd: cwd.into(),
            timeout: None,
            optional: false,
        }
    }

    /// A destructive operation removing `path`.
    pub fn remove(description: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cwd = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self {
            description: description.into(),
            action: Action::RemovePath(path),
            destructive: true,
            cwd,
            timeout: None,
            optional: false,
        }
    }

    /// Mark the operation as destructive.
    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }

    /// Mark the program as an optional tool.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Set (or clear) the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program name for [`Action::Exec`], `None` for filesystem actions.
    pub fn program(&self) -> Option<&str> {
        match &self.action {
            Action::Exec { program, .. } => Some(program),
            Action::RemovePath(_) => None,
        }
    }
}
