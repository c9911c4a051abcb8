//! Plain-text error log of failed creation-time writes.
//!
//! One line per failure:
//! `Error updating creation time for <path>: <error message>`.
//!
//! The file is opened on the first failure, so a clean run leaves nothing
//! behind, then kept open in append mode until the sink is dropped. Each line
//! is flushed immediately; a crash mid-run never loses a recorded failure.
//! If the file cannot be opened, lines go to stderr with a `[TSN-LOG]`
//! prefix instead.

#![allow(missing_docs)]

use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::errors::{Result, TsnError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    /// Nothing written yet; file not opened.
    Pending,
    Open,
    Stderr,
}

/// Append-only error log sink owned by the orchestrator.
#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    writer: Option<LineWriter<File>>,
    state: SinkState,
    lines_written: usize,
}

impl ErrorLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            state: SinkState::Pending,
            lines_written: 0,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of failure lines recorded this run (file or stderr).
    #[must_use]
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Whether lines currently land on stderr instead of the file.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.state == SinkState::Stderr
    }

    /// Record a failed creation-time update for `file`.
    pub fn record(&mut self, file: &Path, error: &impl Display) {
        let line = format_line(file, error);
        self.write_line(&line);
        self.lines_written += 1;
    }

    fn write_line(&mut self, line: &str) {
        if self.state == SinkState::Pending {
            match open_append(&self.path) {
                Ok(file) => {
                    self.writer = Some(LineWriter::new(file));
                    self.state = SinkState::Open;
                }
                Err(e) => {
                    let _ = writeln!(io::stderr(), "[TSN-LOG] cannot open error log: {e}");
                    self.state = SinkState::Stderr;
                }
            }
        }

        if let Some(w) = self.writer.as_mut() {
            if w.write_all(line.as_bytes()).and_then(|()| w.flush()).is_ok() {
                return;
            }
            let _ = writeln!(
                io::stderr(),
                "[TSN-LOG] error log write failed, using stderr: {}",
                self.path.display()
            );
            self.writer = None;
            self.state = SinkState::Stderr;
        }
        let _ = write!(io::stderr(), "[TSN-LOG] {line}");
    }
}

/// The exact line written for one failure, newline included.
#[must_use]
pub fn format_line(file: &Path, error: &impl Display) -> String {
    format!(
        "Error updating creation time for {}: {error}\n",
        file.display()
    )
}

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| TsnError::io(parent, source))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TsnError::io(path, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_until_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error_log.txt");
        let log = ErrorLog::new(&path);
        assert!(!path.exists());
        assert_eq!(log.lines_written(), 0);
    }

    #[test]
    fn writes_one_line_per_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error_log.txt");
        let mut log = ErrorLog::new(&path);

        let err = TsnError::PermissionDenied {
            path: PathBuf::from("/photos/a.jpg"),
        };
        log.record(Path::new("/photos/a.jpg"), &err);
        log.record(Path::new("/photos/b.jpg"), &"file in use");

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Error updating creation time for /photos/a.jpg: [TSN-3001] permission denied for /photos/a.jpg"
        );
        assert_eq!(
            lines[1],
            "Error updating creation time for /photos/b.jpg: file in use"
        );
        assert_eq!(log.lines_written(), 2);
        assert!(!log.is_degraded());
    }

    #[test]
    fn appends_to_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error_log.txt");
        fs::write(&path, "previous run\n").unwrap();

        let mut log = ErrorLog::new(&path);
        log.record(Path::new("x"), &"boom");
        drop(log);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "previous run\nError updating creation time for x: boom\n"
        );
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/nested/error_log.txt");
        let mut log = ErrorLog::new(&path);
        log.record(Path::new("x"), &"boom");
        assert!(path.exists());
    }

    #[test]
    fn degrades_to_stderr_when_unopenable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be opened for append.
        let path = dir.path().join("occupied");
        fs::create_dir_all(&path).unwrap();

        let mut log = ErrorLog::new(&path);
        log.record(Path::new("x"), &"boom");
        assert!(log.is_degraded());
        assert_eq!(log.lines_written(), 1);
    }
}
