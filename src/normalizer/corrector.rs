//! Timestamp corrector: picks the earliest plausible origin time for a file
//! and rewrites its creation time when that moves it backwards.
//!
//! The arithmetic lives in [`corrected_timestamp`] and [`decide`], which
//! touch neither the filesystem nor the clock. [`TimestampCorrector`] wires
//! them to a [`Platform`] and the metadata extractor.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use serde::Serialize;

use crate::core::config::CaptureFallback;
use crate::logger::error_log::ErrorLog;
use crate::metadata::capture_time::{parse_capture_time, raw_capture_time};
use crate::metadata::extractor::{MetadataExtractor, MetadataOutcome};
use crate::normalizer::events::NormalizeEvent;
use crate::platform::pal::{CreationTimeUpdate, Platform};

/// Everything known about one file's timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub modification_time: SystemTime,
    pub creation_time: SystemTime,
    pub capture_time: Option<SystemTime>,
}

/// Why a creation time was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepReason {
    /// The candidate is not strictly earlier than the current creation time.
    NotEarlier,
    /// The candidate is at or before 1970-01-01T00:00:00Z.
    EpochSentinel,
}

impl KeepReason {
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::NotEarlier => "no earlier timestamp",
            Self::EpochSentinel => "candidate is an epoch sentinel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionDecision {
    Apply { from: SystemTime, to: SystemTime },
    Keep {
        reason: KeepReason,
        candidate: SystemTime,
    },
}

/// Minimum of creation, modification and (when present) capture time.
#[must_use]
pub fn corrected_timestamp(record: &FileRecord) -> SystemTime {
    let filesystem = record.creation_time.min(record.modification_time);
    record
        .capture_time
        .map_or(filesystem, |capture| filesystem.min(capture))
}

/// Apply iff the candidate is after the epoch and strictly earlier than the
/// current creation time.
#[must_use]
pub fn decide(record: &FileRecord) -> CorrectionDecision {
    let candidate = corrected_timestamp(record);
    if candidate <= SystemTime::UNIX_EPOCH {
        CorrectionDecision::Keep {
            reason: KeepReason::EpochSentinel,
            candidate,
        }
    } else if candidate < record.creation_time {
        CorrectionDecision::Apply {
            from: record.creation_time,
            to: candidate,
        }
    } else {
        CorrectionDecision::Keep {
            reason: KeepReason::NotEarlier,
            candidate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CorrectorOptions {
    pub dry_run: bool,
    pub capture_fallback: CaptureFallback,
}

/// Reads timestamps, consults image metadata, and applies corrections.
pub struct TimestampCorrector {
    platform: Arc<dyn Platform>,
    extractor: MetadataExtractor,
    options: CorrectorOptions,
}

impl std::fmt::Debug for TimestampCorrector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampCorrector")
            .field("platform", &self.platform.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl TimestampCorrector {
    pub fn new(
        platform: Arc<dyn Platform>,
        extractor: MetadataExtractor,
        options: CorrectorOptions,
    ) -> Self {
        Self {
            platform,
            extractor,
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> CorrectorOptions {
        self.options
    }

    #[must_use]
    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    /// Build the [`FileRecord`] for `path`, collecting diagnostics.
    pub fn record(
        &self,
        path: &Path,
        events: &mut Vec<NormalizeEvent>,
    ) -> Option<FileRecord> {
        let times = match self.platform.file_times(path) {
            Ok(times) => times,
            Err(error) => {
                events.push(NormalizeEvent::Skipped {
                    path: path.to_path_buf(),
                    error: error.to_string(),
                    error_code: error.code(),
                });
                return None;
            }
        };

        Some(FileRecord {
            path: path.to_path_buf(),
            modification_time: times.modified,
            creation_time: times.created,
            capture_time: self.capture_time(path, events),
        })
    }

    /// Correct one file. Returns every event in order; the last one is the
    /// file's outcome. Write failures are also appended to `error_log`.
    pub fn correct(&self, path: &Path, error_log: &mut ErrorLog) -> Vec<NormalizeEvent> {
        let mut events = Vec::new();
        let Some(record) = self.record(path, &mut events) else {
            return events;
        };

        let outcome = match decide(&record) {
            CorrectionDecision::Keep { reason, .. } => NormalizeEvent::Unchanged {
                path: record.path,
                reason,
            },
            CorrectionDecision::Apply { from, to } => self.apply(record.path, from, to, error_log),
        };
        events.push(outcome);
        events
    }

    fn capture_time(&self, path: &Path, events: &mut Vec<NormalizeEvent>) -> Option<SystemTime> {
        let metadata = match self.extractor.extract(path) {
            MetadataOutcome::Found(metadata) => metadata,
            MetadataOutcome::Failed { reason, error_code } => {
                events.push(NormalizeEvent::MetadataUnavailable {
                    path: path.to_path_buf(),
                    reason,
                    error_code,
                });
                return None;
            }
            MetadataOutcome::Absent | MetadataOutcome::NotAnImage => return None,
        };

        let raw = raw_capture_time(&metadata)?;
        match parse_capture_time(raw) {
            Ok(capture) => Some(capture),
            Err(error) => {
                events.push(NormalizeEvent::CaptureTimeInvalid {
                    path: path.to_path_buf(),
                    raw: raw.to_string(),
                    error: error.to_string(),
                    fallback: self.options.capture_fallback,
                });
                match self.options.capture_fallback {
                    // Later than any historical timestamp: a no-op in the minimum.
                    CaptureFallback::Now => Some(SystemTime::now()),
                    CaptureFallback::Skip => None,
                }
            }
        }
    }

    fn apply(
        &self,
        path: PathBuf,
        from: SystemTime,
        to: SystemTime,
        error_log: &mut ErrorLog,
    ) -> NormalizeEvent {
        if self.options.dry_run {
            return NormalizeEvent::Corrected {
                path,
                from,
                to,
                dry_run: true,
            };
        }

        match self.platform.set_creation_time(&path, to) {
            Ok(CreationTimeUpdate::Applied) => NormalizeEvent::Corrected {
                path,
                from,
                to,
                dry_run: false,
            },
            Ok(CreationTimeUpdate::Unsupported { platform }) => {
                NormalizeEvent::UnsupportedPlatform {
                    path,
                    platform,
                    from,
                    to,
                }
            }
            Err(error) => {
                error_log.record(&path, &error);
                NormalizeEvent::CorrectionFailed {
                    path,
                    from,
                    to,
                    error: error.to_string(),
                    error_code: error.code(),
                }
            }
        }
    }
}
