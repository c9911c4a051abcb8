//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use timestamp_normalizer::prelude::*;
//! ```

// Core
pub use crate::core::config::{CaptureFallback, Config};
pub use crate::core::errors::{Result, TsnError};

// Platform
pub use crate::platform::pal::{
    CreationTimeUpdate, FileTimestamps, MockPlatform, NativePlatform, Platform, detect_platform,
};

// Metadata
pub use crate::metadata::capture_time::parse_capture_time;
pub use crate::metadata::extractor::{ImageMetadata, MetadataExtractor, MetadataOutcome};

// Scanner
pub use crate::scanner::patterns::{CachePatternRegistry, FileClass};
pub use crate::scanner::walker::{DirectoryWalker, WalkerConfig};

// Normalizer
pub use crate::normalizer::corrector::{
    CorrectionDecision, CorrectorOptions, FileRecord, KeepReason, TimestampCorrector,
    corrected_timestamp, decide,
};
pub use crate::normalizer::{NormalizeEvent, Normalizer, RunReport};

// Logging
pub use crate::logger::error_log::ErrorLog;
pub use crate::logger::jsonl::{JsonlConfig, JsonlWriter};
