//! TSN-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, TsnError>;

/// Top-level error type for the timestamp normalizer.
#[derive(Debug, Error)]
pub enum TsnError {
    #[error("[TSN-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[TSN-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[TSN-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[TSN-1101] unsupported platform: {details}")]
    UnsupportedPlatform { details: String },

    #[error("[TSN-2001] metadata read failure for {path}: {details}")]
    MetadataRead { path: PathBuf, details: String },

    #[error("[TSN-2002] invalid capture time {raw:?}: {details}")]
    CaptureTimeParse { raw: String, details: String },

    #[error("[TSN-2003] creation time unavailable for {path}: {details}")]
    CreationTimeUnavailable { path: PathBuf, details: String },

    #[error("[TSN-3001] permission denied for {path}")]
    PermissionDenied { path: PathBuf },

    #[error("[TSN-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TsnError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "TSN-1001",
            Self::MissingConfig { .. } => "TSN-1002",
            Self::ConfigParse { .. } => "TSN-1003",
            Self::UnsupportedPlatform { .. } => "TSN-1101",
            Self::MetadataRead { .. } => "TSN-2001",
            Self::CaptureTimeParse { .. } => "TSN-2002",
            Self::CreationTimeUnavailable { .. } => "TSN-2003",
            Self::PermissionDenied { .. } => "TSN-3001",
            Self::Io { .. } => "TSN-3002",
        }
    }

    /// Convenience constructor for IO errors with a known path.
    ///
    /// `PermissionDenied` IO errors are lifted into their own variant so
    /// callers and the error log can tell them apart.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == ErrorKind::PermissionDenied {
            Self::PermissionDenied { path }
        } else {
            Self::Io { path, source }
        }
    }
}

impl From<toml::de::Error> for TsnError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
