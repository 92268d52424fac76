//! Project root precondition.

use crate::error::{Result, ScrubError};
use std::path::{Path, PathBuf};

/// File that must exist at the root of every project scrub runs against.
pub const PROJECT_MARKER: &str = "package.json";

/// Check that `root` is a project root and return its canonical path.
///
/// # Errors
///
/// Returns [`ScrubError::MissingMarker`] if [`PROJECT_MARKER`] is absent, or
/// [`ScrubError::Io`] if `root` cannot be canonicalized.
pub fn ensure_project_root(root: &Path) -> Result<PathBuf> {
    if !root.join(PROJECT_MARKER).is_file() {
        return Err(ScrubError::MissingMarker {
            marker: PROJECT_MARKER,
            root: root.to_path_buf(),
        });
    }
    Ok(root.canonicalize()?)
}
