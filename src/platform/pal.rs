//! PAL trait and platform-specific implementations for reading file
//! timestamps and rewriting creation (birth) time.
//!
//! Only Windows and macOS expose a settable creation time through std. On
//! every other target [`NativePlatform::set_creation_time`] reports
//! [`CreationTimeUpdate::Unsupported`] instead of failing, so callers treat
//! the missing capability as an outcome rather than an error.

#![allow(missing_docs)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::core::errors::{Result, TsnError};

/// Filesystem timestamps relevant to correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileTimestamps {
    pub modified: SystemTime,
    pub created: SystemTime,
}

/// Result of a creation-time write that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreationTimeUpdate {
    /// The new creation time was written.
    Applied,
    /// This platform has no settable creation time; the file was not touched.
    Unsupported { platform: &'static str },
}

/// OS abstraction used by the corrector.
pub trait Platform: Send + Sync {
    /// Short platform identifier for notices and logs.
    fn name(&self) -> &'static str;

    /// Whether [`Platform::set_creation_time`] can ever return `Applied`.
    fn supports_creation_time(&self) -> bool;

    /// Read modification and creation time for `path`.
    fn file_times(&self, path: &Path) -> Result<FileTimestamps>;

    /// Set the creation time of `path`. Open/write failures are returned.
    fn set_creation_time(&self, path: &Path, time: SystemTime) -> Result<CreationTimeUpdate>;
}

/// Native implementation on top of `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativePlatform;

impl NativePlatform {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Platform for NativePlatform {
    fn name(&self) -> &'static str {
        std::env::consts::OS
    }

    fn supports_creation_time(&self) -> bool {
        cfg!(any(windows, target_os = "macos"))
    }

    fn file_times(&self, path: &Path) -> Result<FileTimestamps> {
        let meta = fs::metadata(path).map_err(|source| TsnError::io(path, source))?;
        let modified = meta
            .modified()
            .map_err(|source| TsnError::io(path, source))?;
        let created = meta
            .created()
            .map_err(|error| TsnError::CreationTimeUnavailable {
                path: path.to_path_buf(),
                details: error.to_string(),
            })?;
        Ok(FileTimestamps { modified, created })
    }

    fn set_creation_time(&self, path: &Path, time: SystemTime) -> Result<CreationTimeUpdate> {
        set_created_native(path, time)
    }
}

/// Open for writing, set the birth time, close. The handle is dropped on
/// every return path, including the error paths.
#[cfg(any(windows, target_os = "macos"))]
fn set_created_native(path: &Path, time: SystemTime) -> Result<CreationTimeUpdate> {
    #[cfg(target_os = "macos")]
    use std::os::macos::fs::FileTimesExt;
    #[cfg(windows)]
    use std::os::windows::fs::FileTimesExt;

    let file = fs::OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|source| TsnError::io(path, source))?;
    file.set_times(fs::FileTimes::new().set_created(time))
        .map_err(|source| TsnError::io(path, source))?;
    Ok(CreationTimeUpdate::Applied)
}

#[cfg(not(any(windows, target_os = "macos")))]
fn set_created_native(_path: &Path, _time: SystemTime) -> Result<CreationTimeUpdate> {
    Ok(CreationTimeUpdate::Unsupported {
        platform: std::env::consts::OS,
    })
}

/// In-memory platform for tests and dry embedding.
///
/// Timestamps are registered per path; writes update the stored creation
/// time and are recorded in order.
#[derive(Debug)]
pub struct MockPlatform {
    supported: bool,
    times: RwLock<HashMap<PathBuf, FileTimestamps>>,
    failing: HashSet<PathBuf>,
    writes: Mutex<Vec<(PathBuf, SystemTime)>>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    /// Mock that supports creation-time writes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            supported: true,
            times: RwLock::new(HashMap::new()),
            failing: HashSet::new(),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Mock that behaves like a platform without a settable creation time.
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_times(
        self,
        path: impl Into<PathBuf>,
        modified: SystemTime,
        created: SystemTime,
    ) -> Self {
        self.insert_times(path, FileTimestamps { modified, created });
        self
    }

    /// Make every creation-time write to `path` fail with permission denied.
    #[must_use]
    pub fn fail_writes_for(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    pub fn insert_times(&self, path: impl Into<PathBuf>, times: FileTimestamps) {
        self.times.write().insert(path.into(), times);
    }

    /// Current creation time recorded for `path`.
    pub fn creation_time(&self, path: &Path) -> Option<SystemTime> {
        self.times.read().get(path).map(|t| t.created)
    }

    /// Every successful write, in call order.
    pub fn writes(&self) -> Vec<(PathBuf, SystemTime)> {
        self.writes.lock().clone()
    }
}

impl Platform for MockPlatform {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn supports_creation_time(&self) -> bool {
        self.supported
    }

    fn file_times(&self, path: &Path) -> Result<FileTimestamps> {
        self.times.read().get(path).copied().ok_or_else(|| {
            TsnError::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "no mock timestamps registered"),
            )
        })
    }

    fn set_creation_time(&self, path: &Path, time: SystemTime) -> Result<CreationTimeUpdate> {
        if !self.supported {
            return Ok(CreationTimeUpdate::Unsupported { platform: "mock" });
        }
        if self.failing.contains(path) {
            return Err(TsnError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        let mut times = self.times.write();
        let entry = times.get_mut(path).ok_or_else(|| {
            TsnError::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "no mock timestamps registered"),
            )
        })?;
        entry.created = time;
        self.writes.lock().push((path.to_path_buf(), time));
        Ok(CreationTimeUpdate::Applied)
    }
}

/// Detect the running platform.
pub fn detect_platform() -> Arc<dyn Platform> {
    Arc::new(NativePlatform::new())
}
