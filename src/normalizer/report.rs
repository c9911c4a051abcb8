//! Aggregate counters for one normalization run.

#![allow(missing_docs)]

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::normalizer::events::NormalizeEvent;

// ──────────────────── report types ────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub files_visited: u64,
    pub corrected: u64,
    pub unchanged: u64,
    pub unsupported: u64,
    pub failed: u64,
    pub skipped: u64,
    pub cache_files_deleted: u64,
    pub cache_delete_failures: u64,
    pub metadata_failures: u64,
    pub capture_time_fallbacks: u64,
    /// Lines appended to the error log this run.
    pub error_log_lines: usize,
    #[serde(serialize_with = "duration_ms")]
    pub duration: Duration,
}

fn duration_ms<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

impl RunReport {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
            ..Self::default()
        }
    }

    /// Fold one event into the counters.
    pub fn record(&mut self, event: &NormalizeEvent) {
        let counter = match event {
            NormalizeEvent::CacheFileDeleted { .. } => &mut self.cache_files_deleted,
            NormalizeEvent::CacheFileDeleteFailed { .. } => &mut self.cache_delete_failures,
            NormalizeEvent::MetadataUnavailable { .. } => &mut self.metadata_failures,
            NormalizeEvent::CaptureTimeInvalid { .. } => &mut self.capture_time_fallbacks,
            NormalizeEvent::Corrected { .. } => &mut self.corrected,
            NormalizeEvent::Unchanged { .. } => &mut self.unchanged,
            NormalizeEvent::UnsupportedPlatform { .. } => &mut self.unsupported,
            NormalizeEvent::CorrectionFailed { .. } => &mut self.failed,
            NormalizeEvent::Skipped { .. } => &mut self.skipped,
        };
        *counter += 1;
    }

    /// Whether any file-level failure occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.cache_delete_failures > 0
    }

    /// One-line human summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} files: {} corrected, {} unchanged, {} failed, {} skipped; {} cache files removed",
            self.files_visited,
            self.corrected,
            self.unchanged,
            self.failed,
            self.skipped,
            self.cache_files_deleted,
        );
        if self.unsupported > 0 {
            line.push_str(&format!(", {} not applied (unsupported)", self.unsupported));
        }
        if self.dry_run {
            line.push_str(" (dry run)");
        }
        line
    }
}
