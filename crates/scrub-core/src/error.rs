//! Fatal errors for a scrub run.
//!
//! Per-operation failures never surface here: the task runner absorbs them
//! and records them in [`RunState`](crate::state::RunState). Only conditions
//! that must stop the whole run before (or instead of) executing anything are
//! represented by [`ScrubError`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum ScrubError {
    /// The project root does not contain its required marker file.
    #[error("{marker} not found in {}: not a project root", root.display())]
    MissingMarker {
        /// Marker file name (e.g. `package.json`).
        marker: &'static str,
        /// Directory that was checked.
        root: PathBuf,
    },

    /// The run log could not be created or written.
    #[error("run log {}: {source}", path.display())]
    Log {
        /// Log file path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure on the fatal path.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrubError {
    pub(crate) fn log(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Log {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = ScrubError> = std::result::Result<T, E>;
