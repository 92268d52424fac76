//! Failure classification.
//!
//! Classification is a heuristic over the tail of the run log, not a parser
//! for any particular tool's error format. A permission problem reported in
//! wording that none of the patterns cover is classified as
//! [`FailureKind::Other`] and simply counted as a failure: false negatives
//! are possible and accepted.

/// What caused an operation to fail, as far as the classifier can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The operating system refused access to a path.
    PermissionDenied,
    /// Anything else.
    Other,
}

/// Decides a [`FailureKind`] from recent log output.
pub trait FailureClassifier {
    /// Classify a failure from the most recent lines of its output.
    fn classify(&self, tail: &[String]) -> FailureKind;
}

/// Phrases that indicate an OS-level permission refusal. Matched
/// case-insensitively as substrings.
pub const PERMISSION_PATTERNS: &[&str] = &[
    "permission denied",
    "operation not permitted",
    "eacces",
    "eperm",
    "access denied",
];

/// Case-insensitive substring search for permission errors.
#[derive(Debug, Clone)]
pub struct PermissionHeuristic {
    patterns: Vec<String>,
}

impl PermissionHeuristic {
    /// Heuristic with the built-in [`PERMISSION_PATTERNS`].
    pub fn new() -> Self {
        Self::with_patterns(PERMISSION_PATTERNS.iter().copied())
    }

    /// Heuristic with a custom pattern set.
    pub fn with_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl Default for PermissionHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl FailureClassifier for PermissionHeuristic {
    fn classify(&self, tail: &[String]) -> FailureKind {
        let hit = tail.iter().any(|line| {
            let lower = line.to_lowercase();
            self.patterns.iter().any(|p| lower.contains(p.as_str()))
        });
        if hit {
            FailureKind::PermissionDenied
        } else {
            FailureKind::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_rm_permission_denied() {
        let tail = lines(&["rm: cannot remove 'x': Permission denied"]);
        assert_eq!(
            PermissionHeuristic::new().classify(&tail),
            FailureKind::PermissionDenied
        );
    }

    #[test]
    fn test_command_not_found_is_other() {
        let tail = lines(&["command not found: foo"]);
        assert_eq!(PermissionHeuristic::new().classify(&tail), FailureKind::Other);
    }

    #[test]
    fn test_npm_eacces_anywhere_in_tail() {
        let tail = lines(&[
            "npm ERR! code EACCES",
            "npm ERR! syscall mkdir",
            "npm ERR! path /usr/local/lib/node_modules",
            "npm ERR! A complete log of this run can be found in: ...",
        ]);
        assert_eq!(
            PermissionHeuristic::new().classify(&tail),
            FailureKind::PermissionDenied
        );
    }

    #[test]
    fn test_case_insensitive() {
        let tail = lines(&["OPERATION NOT PERMITTED"]);
        assert_eq!(
            PermissionHeuristic::new().classify(&tail),
            FailureKind::PermissionDenied
        );
    }

    #[test]
    fn test_empty_tail_is_other() {
        assert_eq!(PermissionHeuristic::new().classify(&[]), FailureKind::Other);
    }

    #[test]
    fn test_custom_patterns() {
        let heuristic = PermissionHeuristic::with_patterns(["Read-only file system"]);
        let tail = lines(&["cp: cannot create 'a': read-only file system"]);
        assert_eq!(heuristic.classify(&tail), FailureKind::PermissionDenied);
        assert_eq!(
            heuristic.classify(&lines(&["Permission denied"])),
            FailureKind::Other
        );
    }
}
