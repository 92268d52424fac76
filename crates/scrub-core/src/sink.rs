//! Durable run log.
//!
//! One text file per run: truncated when the run starts, append-only
//! afterwards, never rotated. External processes write straight into it
//! through cloned handles, so the most recent lines are always the most
//! recent command's raw output.

use crate::error::{Result, ScrubError};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::warn;

/// Upper bound on bytes read when collecting a tail.
///
/// Tails are read from the end of the file instead of loading it whole, so a
/// long gradle or pod log never has to fit in memory.
const TAIL_SIZE: u64 = 16 * 1024;

/// Append-only handle on the run log.
#[derive(Debug)]
pub struct LogSink {
    path: PathBuf,
    file: File,
}

impl LogSink {
    /// Create (or truncate) the log at `path` and write the run header.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::Log`] if the parent directory or the file cannot
    /// be created.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ScrubError::log(&path, e))?;
        }

        // Truncate first, then reopen in append mode: children inherit
        // O_APPEND through the cloned descriptors.
        File::create(&path).map_err(|e| ScrubError::log(&path, e))?;
        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| ScrubError::log(&path, e))?;

        let mut sink = Self { path, file };
        let started = chrono::Local::now().to_rfc3339();
        sink.append_line(&format!("# scrub run started {started}"))?;
        Ok(sink)
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single line.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::Log`] on write failure.
    pub fn append_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.file, "{line}")
            .and_then(|()| self.file.flush())
            .map_err(|e| ScrubError::log(&self.path, e))
    }

    /// Append a line, reporting a failed write through `tracing` instead of
    /// returning it.
    pub fn note(&mut self, line: &str) {
        if let Err(e) = self.append_line(line) {
            warn!(error = %e, line, "could not write to run log");
        }
    }

    /// Current length of the log in bytes.
    ///
    /// Used as a marker so a later [`tail_since`](Self::tail_since) only sees
    /// what was written after it.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::Log`] if the file metadata cannot be read.
    pub fn position(&self) -> Result<u64> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| ScrubError::log(&self.path, e))
    }

    /// Handles for a child's stdout and stderr, both appending to this log.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::Log`] if the descriptor cannot be duplicated.
    pub fn child_stdio(&self) -> Result<(Stdio, Stdio)> {
        let out = self
            .file
            .try_clone()
            .map_err(|e| ScrubError::log(&self.path, e))?;
        let err = self
            .file
            .try_clone()
            .map_err(|e| ScrubError::log(&self.path, e))?;
        Ok((Stdio::from(out), Stdio::from(err)))
    }

    /// The last `n` lines of the whole log.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::Log`] if the log cannot be read back.
    pub fn tail(&self, n: usize) -> Result<Vec<String>> {
        self.tail_since(0, n)
    }

    /// The last `n` lines written at or after byte `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::Log`] if the log cannot be read back.
    pub fn tail_since(&self, offset: u64, n: usize) -> Result<Vec<String>> {
        read_last_lines(&self.path, offset, n).map_err(|e| ScrubError::log(&self.path, e))
    }
}

fn read_last_lines(path: &Path, offset: u64, n: usize) -> std::io::Result<Vec<String>> {
    let mut file = File::open(path)?;
    let file_len = file.metadata()?.len();

    let seek_pos = file_len.saturating_sub(TAIL_SIZE).max(offset);
    file.seek(SeekFrom::Start(seek_pos))?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let decoded = String::from_utf8_lossy(&bytes);
    let buffer: &str = &decoded;

    // Seeking past the marker may land mid-line. Drop the partial line
    // unless it is the only line in the window.
    let content = match buffer.find('\n') {
        Some(idx) if seek_pos > offset && idx + 1 < buffer.len() => &buffer[idx + 1..],
        _ => buffer,
    };

    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].iter().map(|l| (*l).to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_truncates_previous_run() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scrub.log");
        std::fs::write(&path, "stale line from last run\n").unwrap();

        let sink = LogSink::create(&path).unwrap();
        let content = std::fs::read_to_string(sink.path()).unwrap();
        assert!(!content.contains("stale line"));
        assert!(content.starts_with("# scrub run started"));
    }

    #[test]
    fn test_create_makes_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs/nested/scrub.log");
        let sink = LogSink::create(&path).unwrap();
        assert!(sink.path().exists());
    }

    #[test]
    fn test_tail_returns_last_lines_in_order() {
        let dir = tempdir().unwrap();
        let mut sink = LogSink::create(dir.path().join("scrub.log")).unwrap();
        for i in 0..10 {
            sink.append_line(&format!("line {i}")).unwrap();
        }

        let tail = sink.tail(3).unwrap();
        assert_eq!(tail, vec!["line 7", "line 8", "line 9"]);
    }

    #[test]
    fn test_tail_since_ignores_earlier_output() {
        let dir = tempdir().unwrap();
        let mut sink = LogSink::create(dir.path().join("scrub.log")).unwrap();
        sink.append_line("rm: cannot remove 'a': Permission denied")
            .unwrap();

        let mark = sink.position().unwrap();
        sink.append_line("command not found: foo").unwrap();

        let tail = sink.tail_since(mark, 50).unwrap();
        assert_eq!(tail, vec!["command not found: foo"]);
    }

    #[test]
    fn test_tail_of_large_log_is_bounded() {
        let dir = tempdir().unwrap();
        let mut sink = LogSink::create(dir.path().join("scrub.log")).unwrap();
        let filler = "x".repeat(200);
        for i in 0..500 {
            sink.append_line(&format!("{i} {filler}")).unwrap();
        }

        let tail = sink.tail(2).unwrap();
        assert_eq!(tail.len(), 2);
        assert!(tail[1].starts_with("499 "));
    }

    #[test]
    fn test_note_appends_line() {
        let dir = tempdir().unwrap();
        let mut sink = LogSink::create(dir.path().join("scrub.log")).unwrap();
        sink.note("removed /app/node_modules (42 bytes)");
        assert_eq!(
            sink.tail(1).unwrap(),
            vec!["removed /app/node_modules (42 bytes)"]
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_note_survives_write_failure() {
        let file = OpenOptions::new().append(true).open("/dev/full").unwrap();
        let mut sink = LogSink {
            path: PathBuf::from("/dev/full"),
            file,
        };
        assert!(sink.append_line("x").is_err());
        sink.note("rm: cannot remove '/app/ios/Pods': Permission denied");
    }

    #[test]
    fn test_tail_keeps_single_oversized_line() {
        let dir = tempdir().unwrap();
        let mut sink = LogSink::create(dir.path().join("scrub.log")).unwrap();
        let mark = sink.position().unwrap();
        sink.append_line("npm ERR! code EACCES").unwrap();
        let long = format!("{}EACCES: permission denied", "y".repeat(20 * 1024));
        sink.append_line(&long).unwrap();

        let tail = sink.tail_since(mark, 30).unwrap();
        assert_eq!(tail.len(), 1);
        assert!(tail[0].ends_with("EACCES: permission denied"));
        assert!(tail[0].len() < long.len());
    }

    #[test]
    fn test_child_output_lands_in_log() {
        let dir = tempdir().unwrap();
        let sink = LogSink::create(dir.path().join("scrub.log")).unwrap();
        let (out, err) = sink.child_stdio().unwrap();

        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg("echo to-stdout; echo to-stderr 1>&2")
            .stdout(out)
            .stderr(err)
            .status()
            .unwrap();
        assert!(status.success());

        let tail = sink.tail(2).unwrap();
        assert_eq!(tail, vec!["to-stdout", "to-stderr"]);
    }
}
