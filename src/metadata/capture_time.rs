//! Capture-time lookup and parsing.

use std::time::SystemTime;

use chrono::{Local, NaiveDateTime};

use crate::core::errors::{Result, TsnError};
use crate::metadata::extractor::ImageMetadata;

/// EXIF field carrying the capture time.
pub const CAPTURE_TIME_FIELD: &str = "DateTime";

/// EXIF date/time layout.
pub const CAPTURE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Raw capture-time string, if the metadata has one.
#[must_use]
pub fn raw_capture_time(metadata: &ImageMetadata) -> Option<&str> {
    metadata.get(CAPTURE_TIME_FIELD)
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` string as local wall-clock time.
///
/// EXIF carries no zone; local time is the only reading that matches the
/// camera clock for photos taken where they are being sorted. A local time
/// that falls in a DST gap is rejected; an ambiguous one resolves to the
/// earlier instant.
pub fn parse_capture_time(raw: &str) -> Result<SystemTime> {
    let trimmed = raw.trim_end_matches('\0');
    let naive = NaiveDateTime::parse_from_str(trimmed, CAPTURE_TIME_FORMAT).map_err(|error| {
        TsnError::CaptureTimeParse {
            raw: raw.to_string(),
            details: error.to_string(),
        }
    })?;
    let local = naive
        .and_local_timezone(Local)
        .earliest()
        .ok_or_else(|| TsnError::CaptureTimeParse {
            raw: raw.to_string(),
            details: "local time does not exist".to_string(),
        })?;
    Ok(SystemTime::from(local))
}
