//! Read-only environment probes used by the planner.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    /// Apple macOS (the only host with iOS tooling).
    MacOs,
    /// Linux.
    Linux,
    /// Windows.
    Windows,
    /// Anything else.
    Other,
}

impl HostOs {
    /// The OS this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
            Self::Windows => "Windows",
            Self::Other => "unknown OS",
        })
    }
}

/// Side-effect-free questions about the environment.
///
/// Implementations must never mutate anything; answers feed the plan, and
/// the plan must be reproducible from the same state.
pub trait Probe {
    /// Whether `path` exists (file, directory or symlink).
    fn exists(&self, path: &Path) -> bool;

    /// Whether `program` can be found on `PATH`.
    fn tool_available(&self, program: &str) -> bool;

    /// The host operating system.
    fn host(&self) -> HostOs;
}

/// Probe backed by the real filesystem and `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl Probe for SystemProbe {
    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn tool_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn host(&self) -> HostOs {
        HostOs::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_system_probe_exists() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        assert!(SystemProbe.exists(&dir.path().join("package.json")));
        assert!(!SystemProbe.exists(&dir.path().join("yarn.lock")));
    }

    #[test]
    fn test_system_probe_tools() {
        assert!(SystemProbe.tool_available("sh"));
        assert!(!SystemProbe.tool_available("scrub-no-such-tool-xyz"));
    }

    #[test]
    fn test_host_display() {
        assert_eq!(HostOs::MacOs.to_string(), "macOS");
    }
}
