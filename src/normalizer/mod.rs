//! Run orchestration: walk a tree, drop cache files, correct creation times.
//!
//! Per file, in traversal order:
//! 1. cache artifacts (`Thumbs.db`) are deleted and never corrected;
//! 2. everything else goes through the [`TimestampCorrector`].
//!
//! Per-file problems become [`NormalizeEvent`]s and never abort the run. Only
//! a root that cannot be inspected at all is an error.

#![allow(missing_docs)]

pub mod corrector;
pub mod events;
pub mod report;

#[cfg(test)]
mod test_properties;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::core::config::{Config, ScannerConfig};
use crate::core::errors::{Result, TsnError};
use crate::logger::error_log::ErrorLog;
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};
use crate::metadata::extractor::MetadataExtractor;
use crate::platform::pal::Platform;
use crate::scanner::patterns::{CachePatternRegistry, FileClass};
use crate::scanner::walker::{DirectoryWalker, WalkerConfig};

pub use corrector::{CorrectorOptions, TimestampCorrector};
pub use events::NormalizeEvent;
pub use report::RunReport;

pub struct Normalizer {
    scanner: ScannerConfig,
    registry: CachePatternRegistry,
    corrector: TimestampCorrector,
    error_log: ErrorLog,
    activity_log: Option<JsonlWriter>,
    dry_run: bool,
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("corrector", &self.corrector)
            .field("error_log", &self.error_log.path())
            .field("activity_log", &self.activity_log.is_some())
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Normalizer {
    /// Build a normalizer from loaded configuration. Opens the activity log
    /// when one is configured.
    pub fn new(config: &Config, platform: Arc<dyn Platform>) -> Self {
        let registry = CachePatternRegistry::from_config(config);
        let options = CorrectorOptions {
            dry_run: config.correction.dry_run,
            capture_fallback: config.correction.capture_fallback,
        };
        let corrector =
            TimestampCorrector::new(platform, MetadataExtractor::new(registry.clone()), options);
        let activity_log = config
            .paths
            .activity_log
            .as_ref()
            .map(|path| {
                JsonlWriter::open(
                    JsonlConfig::new(path)
                        .with_fallback(config.paths.activity_log_fallback.clone()),
                )
            });

        Self {
            scanner: config.scanner.clone(),
            registry,
            corrector,
            error_log: ErrorLog::new(&config.paths.error_log),
            activity_log,
            dry_run: config.correction.dry_run,
        }
    }

    #[must_use]
    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Where activity-log lines currently go: `normal`, `fallback`, `stderr`
    /// or `discard`. `None` when no activity log is configured.
    #[must_use]
    pub fn activity_log_state(&self) -> Option<&'static str> {
        self.activity_log.as_ref().map(JsonlWriter::state)
    }

    /// Set when the platform cannot write creation times at all, so every
    /// correction of this run will only be reported.
    #[must_use]
    pub fn platform_warning(&self) -> Option<TsnError> {
        let platform = self.corrector.platform();
        (!platform.supports_creation_time()).then(|| TsnError::UnsupportedPlatform {
            details: format!(
                "{} cannot set file creation times; corrections are reported only",
                platform.name()
            ),
        })
    }

    /// Normalize every file under `root`, reporting each event to `on_event`
    /// as it happens.
    pub fn run<F>(&mut self, root: &Path, mut on_event: F) -> Result<RunReport>
    where
        F: FnMut(&NormalizeEvent),
    {
        let start = Instant::now();
        let mut report = RunReport::new(root, self.dry_run);
        let lines_before = self.error_log.lines_written();
        self.log_marker(
            LogEntry::new(EventType::RunStart, Severity::Info)
                .with_path(root)
                .with_details(if self.dry_run { "dry-run" } else { "live" }),
        );
        if let Some(warning) = self.platform_warning() {
            let mut entry = LogEntry::new(EventType::UnsupportedPlatform, Severity::Warning)
                .with_path(root);
            entry.error_code = Some(warning.code().to_string());
            entry.error_message = Some(warning.to_string());
            self.log_marker(entry);
        }

        let walker = DirectoryWalker::new(WalkerConfig::from_scanner(
            root.to_path_buf(),
            &self.scanner,
        ));
        let walked = walker.for_each_file(|entry| {
            report.files_visited += 1;
            for event in self.process(&entry.path) {
                report.record(&event);
                if let Some(log) = self.activity_log.as_mut() {
                    log.write_entry(&event.to_log_entry());
                }
                on_event(&event);
            }
        });

        report.duration = start.elapsed();
        report.error_log_lines = self.error_log.lines_written() - lines_before;
        let severity = if report.has_failures() {
            Severity::Warning
        } else {
            Severity::Info
        };
        self.log_marker(
            LogEntry::new(EventType::RunComplete, severity)
                .with_path(root)
                .with_details(report.summary()),
        );
        if let Some(log) = self.activity_log.as_mut() {
            log.flush();
        }

        walked?;
        Ok(report)
    }

    /// Handle one file; the returned events are in the order they occurred.
    pub fn process(&mut self, path: &Path) -> Vec<NormalizeEvent> {
        match self.registry.classify(path) {
            FileClass::CacheArtifact { pattern_name } => {
                vec![self.remove_cache_file(path, pattern_name.into_owned())]
            }
            FileClass::Image | FileClass::Regular => {
                self.corrector.correct(path, &mut self.error_log)
            }
        }
    }

    fn remove_cache_file(&self, path: &Path, pattern: String) -> NormalizeEvent {
        if self.dry_run {
            return NormalizeEvent::CacheFileDeleted {
                path: path.to_path_buf(),
                pattern,
                dry_run: true,
            };
        }
        match fs::remove_file(path) {
            Ok(()) => NormalizeEvent::CacheFileDeleted {
                path: path.to_path_buf(),
                pattern,
                dry_run: false,
            },
            Err(source) => {
                let error = TsnError::io(path, source);
                NormalizeEvent::CacheFileDeleteFailed {
                    path: path.to_path_buf(),
                    error: error.to_string(),
                    error_code: error.code(),
                }
            }
        }
    }

    fn log_marker(&mut self, entry: LogEntry) {
        if let Some(log) = self.activity_log.as_mut() {
            log.write_entry(&entry);
        }
    }
}
