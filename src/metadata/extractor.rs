//! EXIF metadata extraction for raster images.
//!
//! Extraction never fails the caller: every problem is folded into
//! [`MetadataOutcome`] so the orchestrator decides how loudly to report it.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{In, Reader, Value};

use crate::core::errors::TsnError;
use crate::scanner::patterns::CachePatternRegistry;

/// Field name → value for the primary image directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    fields: BTreeMap<String, String>,
}

impl ImageMetadata {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }
}

impl FromIterator<(String, String)> for ImageMetadata {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Typed result of a metadata read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataOutcome {
    Found(ImageMetadata),
    /// A supported image without an EXIF block.
    Absent,
    /// Extension is not a supported raster format; the file was not opened.
    NotAnImage,
    /// The file could not be opened or parsed.
    Failed {
        reason: String,
        error_code: &'static str,
    },
}

impl MetadataOutcome {
    /// The field mapping, empty unless metadata was found.
    #[must_use]
    pub fn into_fields(self) -> BTreeMap<String, String> {
        match self {
            Self::Found(metadata) => metadata.into_fields(),
            Self::Absent | Self::NotAnImage | Self::Failed { .. } => BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&ImageMetadata> {
        match self {
            Self::Found(metadata) => Some(metadata),
            _ => None,
        }
    }
}

/// Reads EXIF fields from files whose extension marks them as images.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    registry: CachePatternRegistry,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(CachePatternRegistry::default())
    }
}

impl MetadataExtractor {
    #[must_use]
    pub fn new(registry: CachePatternRegistry) -> Self {
        Self { registry }
    }

    /// Extract metadata from `path`, gated on the image-extension list.
    #[must_use]
    pub fn extract(&self, path: &Path) -> MetadataOutcome {
        if !self.registry.is_supported_image(path) {
            return MetadataOutcome::NotAnImage;
        }
        read_exif(path)
    }
}

/// Extract metadata from `path` regardless of its extension.
#[must_use]
pub fn read_exif(path: &Path) -> MetadataOutcome {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) => return failed(path, &error),
    };
    let mut reader = BufReader::new(file);

    match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => {
            let metadata: ImageMetadata = exif
                .fields()
                .filter(|field| field.ifd_num == In::PRIMARY)
                .map(|field| (field.tag.to_string(), field_text(field)))
                .collect();
            if metadata.is_empty() {
                MetadataOutcome::Absent
            } else {
                MetadataOutcome::Found(metadata)
            }
        }
        Err(exif::Error::NotFound(_)) => MetadataOutcome::Absent,
        Err(error) => failed(path, &error),
    }
}

fn failed(path: &Path, details: &dyn std::fmt::Display) -> MetadataOutcome {
    let error = TsnError::MetadataRead {
        path: path.to_path_buf(),
        details: details.to_string(),
    };
    MetadataOutcome::Failed {
        reason: error.to_string(),
        error_code: error.code(),
    }
}

/// ASCII fields keep their raw text so `DateTime` retains `YYYY:MM:DD`;
/// everything else uses the library's display form.
fn field_text(field: &exif::Field) -> String {
    match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|part| {
                String::from_utf8_lossy(part)
                    .trim_end_matches('\0')
                    .to_string()
            })
            .unwrap_or_default(),
        _ => field.display_value().to_string(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Minimal little-endian TIFF with a single IFD0 `DateTime` entry.
    pub fn tiff_with_datetime(text: &str) -> Vec<u8> {
        let mut value = text.as_bytes().to_vec();
        value.push(0);
        let count = u32::try_from(value.len()).expect("fixture string fits in u32");

        let mut out = Vec::new();
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&8u32.to_le_bytes());
        // IFD0: one entry.
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&0x0132u16.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&26u32.to_le_bytes());
        // No next IFD.
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&value);
        out
    }

    /// PNG with only an IEND chunk.
    pub fn bare_png() -> Vec<u8> {
        let mut out = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.extend_from_slice(b"IEND");
        out.extend_from_slice(&[0xAE, 0x42, 0x60, 0x82]);
        out
    }
}
