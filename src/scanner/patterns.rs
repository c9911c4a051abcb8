//! File classification: transient cache artifacts and probe-worthy images.

#![allow(missing_docs)]

use std::borrow::Cow;
use std::path::Path;

use crate::core::config::Config;

/// What the normalizer should do with a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileClass {
    /// Transient cache file; deleted, never corrected.
    CacheArtifact { pattern_name: Cow<'static, str> },
    /// Raster image whose EXIF capture time is consulted.
    Image,
    /// Anything else; filesystem timestamps only.
    Regular,
}

/// Built-in cache files, matched by lowercased file name.
const BUILTIN_PATTERNS: &[(&str, &str)] = &[("windows-thumbnail-cache", "thumbs.db")];

fn builtin_pattern(lowercase_name: &str) -> Option<&'static str> {
    BUILTIN_PATTERNS
        .iter()
        .find(|(_, file_name)| *file_name == lowercase_name)
        .map(|(pattern_name, _)| *pattern_name)
}

/// Registry of cache-file names and image extensions.
#[derive(Debug, Clone)]
pub struct CachePatternRegistry {
    /// Lowercased extra names from configuration.
    custom_names: Vec<String>,
    /// Lowercased extensions without the leading dot.
    image_extensions: Vec<String>,
    cleanup_enabled: bool,
}

impl Default for CachePatternRegistry {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CachePatternRegistry {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let custom_names = config
            .cleanup
            .cache_file_names
            .iter()
            .map(|name| name.to_ascii_lowercase())
            .filter(|name| builtin_pattern(name).is_none())
            .collect();
        Self {
            custom_names,
            image_extensions: config
                .correction
                .image_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
            cleanup_enabled: config.cleanup.enabled,
        }
    }

    /// Classify one file by name and extension.
    #[must_use]
    pub fn classify(&self, path: &Path) -> FileClass {
        if let Some(pattern_name) = self.cache_pattern(path) {
            return FileClass::CacheArtifact { pattern_name };
        }
        if self.is_supported_image(path) {
            FileClass::Image
        } else {
            FileClass::Regular
        }
    }

    /// Name of the cache pattern `path` matches, if cleanup is enabled.
    #[must_use]
    pub fn cache_pattern(&self, path: &Path) -> Option<Cow<'static, str>> {
        if !self.cleanup_enabled {
            return None;
        }
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();

        if let Some(pattern_name) = builtin_pattern(&name) {
            return Some(Cow::Borrowed(pattern_name));
        }
        self.custom_names
            .iter()
            .find(|custom| **custom == name)
            .map(|custom| Cow::Owned(format!("custom:{custom}")))
    }

    /// Whether `path` has one of the configured image extensions.
    #[must_use]
    pub fn is_supported_image(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| {
            let ext = ext.to_string_lossy();
            self.image_extensions
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbs_db_is_cache_artifact_in_any_case() {
        let registry = CachePatternRegistry::default();
        for name in ["Thumbs.db", "thumbs.db", "THUMBS.DB"] {
            let class = registry.classify(Path::new("/photos/2019").join(name).as_path());
            assert_eq!(
                class,
                FileClass::CacheArtifact {
                    pattern_name: Cow::Borrowed("windows-thumbnail-cache")
                },
                "{name}"
            );
        }
    }

    #[test]
    fn suffix_lookalikes_are_not_cache_artifacts() {
        let registry = CachePatternRegistry::default();
        assert_eq!(
            registry.classify(Path::new("/photos/MyThumbs.db")),
            FileClass::Regular
        );
        assert_eq!(
            registry.classify(Path::new("/photos/Thumbs.db.bak")),
            FileClass::Regular
        );
    }

    #[test]
    fn image_extensions_case_insensitive() {
        let registry = CachePatternRegistry::default();
        for name in ["a.jpg", "b.JPEG", "c.Png", "d.tiff", "e.bmp", "f.GIF"] {
            assert_eq!(
                registry.classify(Path::new(name)),
                FileClass::Image,
                "{name}"
            );
        }
        assert_eq!(registry.classify(Path::new("notes.txt")), FileClass::Regular);
        assert_eq!(registry.classify(Path::new("raw.tif")), FileClass::Regular);
        assert_eq!(registry.classify(Path::new("jpg")), FileClass::Regular);
    }

    #[test]
    fn custom_names_from_config() {
        let mut config = Config::default();
        config.cleanup.cache_file_names = vec!["Thumbs.db".into(), "ehthumbs.db".into()];
        let registry = CachePatternRegistry::from_config(&config);
        assert_eq!(
            registry.cache_pattern(Path::new("/x/EHThumbs.db")),
            Some(Cow::Owned("custom:ehthumbs.db".to_string()))
        );
        // The builtin is not duplicated as a custom entry.
        assert_eq!(registry.custom_names, vec!["ehthumbs.db"]);
    }

    #[test]
    fn builtin_lookup_compares_lowercased_names() {
        assert_eq!(builtin_pattern("thumbs.db"), Some("windows-thumbnail-cache"));
        assert_eq!(builtin_pattern("ehthumbs.db"), None);
        assert_eq!(
            CachePatternRegistry::default().cache_pattern(Path::new("/x/THUMBS.DB")),
            Some(Cow::Borrowed("windows-thumbnail-cache"))
        );
    }

    #[test]
    fn cleanup_disabled_classifies_by_extension_only() {
        let mut config = Config::default();
        config.cleanup.enabled = false;
        let registry = CachePatternRegistry::from_config(&config);
        assert_eq!(registry.classify(Path::new("/x/Thumbs.db")), FileClass::Regular);
    }
}
