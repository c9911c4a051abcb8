//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, TsnError};

/// Full normalizer configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub cleanup: CleanupConfig,
    pub correction: CorrectionConfig,
    pub paths: PathsConfig,
}

/// Traversal behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScannerConfig {
    pub follow_symlinks: bool,
    /// Deepest directory level to descend into; unlimited when unset.
    pub max_depth: Option<usize>,
    pub excluded_paths: Vec<PathBuf>,
}

/// Transient cache-file removal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CleanupConfig {
    pub enabled: bool,
    /// File names deleted on sight (ASCII case-insensitive).
    pub cache_file_names: Vec<String>,
}

/// Creation-time correction knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CorrectionConfig {
    pub dry_run: bool,
    pub capture_fallback: CaptureFallback,
    /// Extensions (without the dot) that are probed for EXIF capture time.
    pub image_extensions: Vec<String>,
}

/// What to do when an image carries a capture time that does not parse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFallback {
    /// Substitute the current wall-clock time. Never earlier than an existing
    /// timestamp, so the capture source contributes nothing.
    #[default]
    Now,
    /// Drop the capture source and use filesystem timestamps only.
    Skip,
}

impl std::str::FromStr for CaptureFallback {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "now" => Ok(Self::Now),
            "skip" => Ok(Self::Skip),
            other => Err(format!("expected \"now\" or \"skip\", got {other:?}")),
        }
    }
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    /// Plain-text log of failed creation-time writes, relative to the
    /// working directory unless absolute.
    pub error_log: PathBuf,
    /// Optional JSONL activity log.
    pub activity_log: Option<PathBuf>,
    /// Where the activity log goes when `activity_log` cannot be opened.
    pub activity_log_fallback: Option<PathBuf>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            max_depth: None,
            excluded_paths: Vec::new(),
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_file_names: vec!["Thumbs.db".to_string()],
        }
    }
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            capture_fallback: CaptureFallback::Now,
            image_extensions: ["png", "jpg", "jpeg", "tiff", "bmp", "gif"]
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .map_or_else(
                || {
                    eprintln!(
                        "[TSN-CONFIG] WARNING: HOME not set, falling back to the working directory for the config path"
                    );
                    PathBuf::from(".")
                },
                PathBuf::from,
            );
        Self {
            config_file: home_dir.join(".config").join("tsn").join("config.toml"),
            error_log: PathBuf::from("error_log.txt"),
            activity_log: None,
            activity_log_fallback: None,
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load configuration from `path` (or the default location), apply
    /// `TSN_*` environment overrides and validate.
    ///
    /// A missing file at the default location yields defaults; a missing
    /// explicitly requested file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| TsnError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(TsnError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides()?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        set_env_bool(
            "TSN_SCANNER_FOLLOW_SYMLINKS",
            &mut self.scanner.follow_symlinks,
        )?;
        if let Some(raw) = env_var("TSN_SCANNER_MAX_DEPTH") {
            self.scanner.max_depth = Some(parse_env_usize("TSN_SCANNER_MAX_DEPTH", &raw)?);
        }
        set_env_bool("TSN_CLEANUP_ENABLED", &mut self.cleanup.enabled)?;
        set_env_bool("TSN_DRY_RUN", &mut self.correction.dry_run)?;

        if let Some(raw) = env_var("TSN_CAPTURE_FALLBACK") {
            self.correction.capture_fallback =
                raw.parse().map_err(|details: String| TsnError::ConfigParse {
                    context: "env",
                    details: format!("TSN_CAPTURE_FALLBACK={raw:?}: {details}"),
                })?;
        }
        if let Some(raw) = env_var("TSN_ERROR_LOG") {
            self.paths.error_log = PathBuf::from(raw);
        }
        if let Some(raw) = env_var("TSN_ACTIVITY_LOG") {
            self.paths.activity_log = Some(PathBuf::from(raw));
        }
        if let Some(raw) = env_var("TSN_ACTIVITY_LOG_FALLBACK") {
            self.paths.activity_log_fallback = Some(PathBuf::from(raw));
        }
        Ok(())
    }

    /// Strip leading dots and lowercase extensions so `.JPG` and `jpg` agree.
    fn normalize(&mut self) {
        for ext in &mut self.correction.image_extensions {
            *ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        }
        for name in &mut self.cleanup.cache_file_names {
            *name = name.trim().to_string();
        }
    }

    fn validate(&self) -> Result<()> {
        if self.scanner.max_depth == Some(0) {
            return Err(TsnError::InvalidConfig {
                details: "scanner.max_depth must be at least 1".to_string(),
            });
        }

        for name in &self.cleanup.cache_file_names {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(TsnError::InvalidConfig {
                    details: format!(
                        "cleanup.cache_file_names entries must be bare file names, got {name:?}"
                    ),
                });
            }
        }

        for ext in &self.correction.image_extensions {
            if ext.is_empty() || ext.contains(['/', '\\', '.']) {
                return Err(TsnError::InvalidConfig {
                    details: format!(
                        "correction.image_extensions entries must be bare extensions, got {ext:?}"
                    ),
                });
            }
        }

        if self.paths.error_log.as_os_str().is_empty() {
            return Err(TsnError::InvalidConfig {
                details: "paths.error_log must not be empty".to_string(),
            });
        }

        if self.paths.activity_log_fallback.is_some() && self.paths.activity_log.is_none() {
            return Err(TsnError::InvalidConfig {
                details: "paths.activity_log_fallback requires paths.activity_log".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_usize(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|error| TsnError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}

fn set_env_bool(name: &str, slot: &mut bool) -> Result<()> {
    if let Some(raw) = env_var(name) {
        *slot = parse_env_bool(name, &raw)?;
    }
    Ok(())
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.trim()
        .parse::<bool>()
        .map_err(|error| TsnError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
