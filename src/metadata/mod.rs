//! Embedded image metadata: EXIF extraction and capture-time parsing.

pub mod capture_time;
pub mod extractor;
