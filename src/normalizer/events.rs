//! Per-file events emitted during a run.
//!
//! Every observable thing the normalizer does to (or learns about) a file is
//! one [`NormalizeEvent`]. The CLI renders them, the activity log persists
//! them, and [`RunReport`](crate::normalizer::report::RunReport) counts them.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Serialize, Serializer};

use crate::core::config::CaptureFallback;
use crate::core::timefmt::{format_local, format_rfc3339};
use crate::logger::jsonl::{EventType, LogEntry, Severity};
use crate::normalizer::corrector::KeepReason;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NormalizeEvent {
    CacheFileDeleted {
        path: PathBuf,
        pattern: String,
        dry_run: bool,
    },
    CacheFileDeleteFailed {
        path: PathBuf,
        error: String,
        error_code: &'static str,
    },
    /// EXIF could not be read; the file is treated as having no metadata.
    MetadataUnavailable {
        path: PathBuf,
        reason: String,
        error_code: &'static str,
    },
    CaptureTimeInvalid {
        path: PathBuf,
        raw: String,
        error: String,
        fallback: CaptureFallback,
    },
    Corrected {
        path: PathBuf,
        #[serde(serialize_with = "rfc3339")]
        from: SystemTime,
        #[serde(serialize_with = "rfc3339")]
        to: SystemTime,
        dry_run: bool,
    },
    Unchanged { path: PathBuf, reason: KeepReason },
    UnsupportedPlatform {
        path: PathBuf,
        platform: &'static str,
        #[serde(serialize_with = "rfc3339")]
        from: SystemTime,
        #[serde(serialize_with = "rfc3339")]
        to: SystemTime,
    },
    CorrectionFailed {
        path: PathBuf,
        #[serde(serialize_with = "rfc3339")]
        from: SystemTime,
        #[serde(serialize_with = "rfc3339")]
        to: SystemTime,
        error: String,
        error_code: &'static str,
    },
    /// Timestamps could not be read; nothing was attempted.
    Skipped {
        path: PathBuf,
        error: String,
        error_code: &'static str,
    },
}

fn rfc3339<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_rfc3339(*time))
}

impl NormalizeEvent {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::CacheFileDeleted { path, .. }
            | Self::CacheFileDeleteFailed { path, .. }
            | Self::MetadataUnavailable { path, .. }
            | Self::CaptureTimeInvalid { path, .. }
            | Self::Corrected { path, .. }
            | Self::Unchanged { path, .. }
            | Self::UnsupportedPlatform { path, .. }
            | Self::CorrectionFailed { path, .. }
            | Self::Skipped { path, .. } => path,
        }
    }

    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::CacheFileDeleted { .. } => EventType::CacheFileDeleted,
            Self::CacheFileDeleteFailed { .. } => EventType::CacheFileDeleteFailed,
            Self::MetadataUnavailable { .. } => EventType::MetadataUnavailable,
            Self::CaptureTimeInvalid { .. } => EventType::CaptureTimeInvalid,
            Self::Corrected { .. } => EventType::CreationTimeCorrected,
            Self::Unchanged { .. } => EventType::CreationTimeUnchanged,
            Self::UnsupportedPlatform { .. } => EventType::UnsupportedPlatform,
            Self::CorrectionFailed { .. } => EventType::CorrectionFailed,
            Self::Skipped { .. } => EventType::FileSkipped,
        }
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::CacheFileDeleted { .. } | Self::Corrected { .. } | Self::Unchanged { .. } => {
                Severity::Info
            }
            Self::MetadataUnavailable { .. }
            | Self::CaptureTimeInvalid { .. }
            | Self::UnsupportedPlatform { .. }
            | Self::Skipped { .. } => Severity::Warning,
            Self::CacheFileDeleteFailed { .. } | Self::CorrectionFailed { .. } => {
                Severity::Critical
            }
        }
    }

    /// Whether this event is routine noise (shown only in verbose mode).
    #[must_use]
    pub const fn is_routine(&self) -> bool {
        matches!(self, Self::Unchanged { .. } | Self::Skipped { .. })
    }

    /// Whether this event reports a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::CacheFileDeleteFailed { .. } | Self::CorrectionFailed { .. }
        )
    }

    /// One-line human message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::CacheFileDeleted {
                path,
                dry_run: false,
                ..
            } => format!("Suppress {}", path.display()),
            Self::CacheFileDeleted {
                path,
                dry_run: true,
                ..
            } => format!("Would suppress {}", path.display()),
            Self::CacheFileDeleteFailed { path, error, .. } => {
                format!("Could not delete {}: {error}", path.display())
            }
            Self::MetadataUnavailable { path, reason, .. } => {
                format!("Error reading EXIF data from {}: {reason}", path.display())
            }
            Self::CaptureTimeInvalid {
                path,
                error,
                fallback,
                ..
            } => {
                let action = match fallback {
                    CaptureFallback::Now => "using current time",
                    CaptureFallback::Skip => "ignoring capture time",
                };
                format!(
                    "Error converting capture time for {}: {error} ({action})",
                    path.display()
                )
            }
            Self::Corrected {
                path,
                from,
                to,
                dry_run,
            } => format!(
                "{} creation time from {} to {} for {}",
                if *dry_run { "Would update" } else { "Updated" },
                format_local(*from),
                format_local(*to),
                path.display()
            ),
            Self::Unchanged { path, reason } => format!(
                "Creation time unchanged for {} ({})",
                path.display(),
                reason.describe()
            ),
            Self::UnsupportedPlatform {
                path,
                platform,
                from,
                to,
            } => format!(
                "Updating creation time not supported on this platform ({platform}): {} would move from {} to {}",
                path.display(),
                format_local(*from),
                format_local(*to)
            ),
            Self::CorrectionFailed { path, error, .. } => format!(
                "Error updating creation time for {}: {error}",
                path.display()
            ),
            Self::Skipped { path, error, .. } => {
                format!("Skipped {}: {error}", path.display())
            }
        }
    }

    /// Activity-log representation.
    #[must_use]
    pub fn to_log_entry(&self) -> LogEntry {
        let mut entry = LogEntry::new(self.event_type(), self.severity()).with_path(self.path());
        match self {
            Self::CacheFileDeleted {
                pattern, dry_run, ..
            } => {
                entry.dry_run = Some(*dry_run);
                entry.details = Some(pattern.clone());
            }
            Self::CacheFileDeleteFailed {
                error, error_code, ..
            }
            | Self::Skipped {
                error, error_code, ..
            } => {
                entry.error_code = Some((*error_code).to_string());
                entry.error_message = Some(error.clone());
            }
            Self::MetadataUnavailable {
                reason, error_code, ..
            } => {
                entry.error_code = Some((*error_code).to_string());
                entry.error_message = Some(reason.clone());
            }
            Self::CaptureTimeInvalid { raw, error, .. } => {
                entry.error_code = Some("TSN-2002".to_string());
                entry.error_message = Some(error.clone());
                entry.details = Some(raw.clone());
            }
            Self::Corrected {
                from, to, dry_run, ..
            } => {
                entry.from = Some(format_rfc3339(*from));
                entry.to = Some(format_rfc3339(*to));
                entry.dry_run = Some(*dry_run);
            }
            Self::Unchanged { reason, .. } => {
                entry.details = Some(reason.describe().to_string());
            }
            Self::UnsupportedPlatform {
                platform, from, to, ..
            } => {
                entry.from = Some(format_rfc3339(*from));
                entry.to = Some(format_rfc3339(*to));
                entry.details = Some((*platform).to_string());
            }
            Self::CorrectionFailed {
                from,
                to,
                error,
                error_code,
                ..
            } => {
                entry.from = Some(format_rfc3339(*from));
                entry.to = Some(format_rfc3339(*to));
                entry.error_code = Some((*error_code).to_string());
                entry.error_message = Some(error.clone());
            }
        }
        entry
    }
}
