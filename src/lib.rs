#![forbid(unsafe_code)]

//! Timestamp Normalizer (tsn): moves each file's creation time back to its
//! earliest plausible origin.
//!
//! For every file under a root directory:
//! 1. **Cache cleanup**: stray `Thumbs.db` files are deleted on sight
//! 2. **Correction**: creation time becomes the minimum of creation,
//!    modification and (for images) EXIF capture time, when that is earlier
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use timestamp_normalizer::prelude::*;
//!
//! let config = Config::load(None)?;
//! let mut normalizer = Normalizer::new(&config, detect_platform());
//! let report = normalizer.run(std::path::Path::new("."), |event| {
//!     println!("{}", event.message());
//! })?;
//! println!("{}", report.summary());
//! # Ok::<(), TsnError>(())
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use timestamp_normalizer::normalizer::corrector::{FileRecord, decide};
//! use timestamp_normalizer::scanner::walker::{DirectoryWalker, WalkerConfig};
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod metadata;
pub mod normalizer;
pub mod platform;
pub mod scanner;
