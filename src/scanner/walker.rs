//! Sequential directory walker yielding regular files.
//!
//! The walk is depth-first over an explicit work stack so deep trees never
//! grow the call stack. Unreadable directories are skipped; the walker never
//! fails once the root has been accepted.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::config::ScannerConfig;
use crate::core::errors::{Result, TsnError};

/// Walker configuration derived from `ScannerConfig`.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    pub root_path: PathBuf,
    /// `None` walks the whole tree.
    pub max_depth: Option<usize>,
    pub follow_symlinks: bool,
    pub excluded_paths: HashSet<PathBuf>,
}

impl WalkerConfig {
    #[must_use]
    pub fn from_scanner(root_path: PathBuf, scanner: &ScannerConfig) -> Self {
        Self {
            root_path,
            max_depth: scanner.max_depth,
            follow_symlinks: scanner.follow_symlinks,
            excluded_paths: scanner.excluded_paths.iter().cloned().collect(),
        }
    }
}

/// A regular file discovered during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    /// Depth of the containing directory (root = 0).
    pub depth: usize,
}

/// Item in the work stack: (directory_path, depth).
type WorkItem = (PathBuf, usize);

/// Sequential directory walker.
///
/// Safety invariants:
/// - Symlinked files are always visited; symlinked directories are entered
///   only when `follow_symlinks` is set
/// - Skips excluded paths
/// - Stops descending at `max_depth` when one is configured
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    config: WalkerConfig,
}

impl DirectoryWalker {
    #[must_use]
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Collect every file under the root.
    ///
    /// A missing root yields an empty walk; a root that exists but cannot be
    /// stat'ed for another reason is an error.
    pub fn walk(&self) -> Result<Vec<WalkEntry>> {
        let mut files = Vec::new();
        self.for_each_file(|entry| files.push(entry))?;
        Ok(files)
    }

    /// Visit files one at a time in traversal order.
    pub fn for_each_file<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(WalkEntry),
    {
        let root = &self.config.root_path;
        let meta = match metadata_for_path(root, true) {
            Ok(m) => m,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(source) => return Err(TsnError::io(root, source)),
        };

        if !meta.is_dir() {
            // A single file root is processed as-is.
            if meta.is_file() {
                visit(WalkEntry {
                    path: root.clone(),
                    depth: 0,
                });
            }
            return Ok(());
        }

        let mut stack: Vec<WorkItem> = vec![(root.clone(), 0)];
        while let Some((dir_path, depth)) = stack.pop() {
            self.process_directory(&dir_path, depth, &mut stack, &mut visit);
        }
        Ok(())
    }

    /// Read one directory: emit files, push subdirectories.
    fn process_directory<F>(
        &self,
        dir_path: &Path,
        depth: usize,
        stack: &mut Vec<WorkItem>,
        visit: &mut F,
    ) where
        F: FnMut(WalkEntry),
    {
        if self.config.excluded_paths.contains(dir_path) {
            return;
        }

        // Permission errors, races with deletion and the rest: skip the subtree.
        let Ok(entries) = fs::read_dir(dir_path) else {
            return;
        };

        let mut children = Vec::new();
        for entry_result in entries {
            let Ok(entry) = entry_result else {
                continue;
            };
            let child_path = entry.path();
            if self.config.excluded_paths.contains(&child_path) {
                continue;
            }

            // file_type() is usually free (cached in the directory entry).
            let Ok(ft) = entry.file_type() else {
                continue;
            };

            let (is_dir, is_file) = if ft.is_symlink() {
                // Dangling links are skipped.
                let Ok(target) = metadata_for_path(&child_path, true) else {
                    continue;
                };
                (
                    target.is_dir() && self.config.follow_symlinks,
                    target.is_file(),
                )
            } else {
                (ft.is_dir(), ft.is_file())
            };

            if is_dir {
                if self.config.max_depth.is_none_or(|max| depth < max) {
                    children.push(child_path);
                }
            } else if is_file {
                visit(WalkEntry {
                    path: child_path,
                    depth,
                });
            }
        }

        // Reverse so the first listed child is popped first.
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }
}

fn metadata_for_path(path: &Path, follow_symlinks: bool) -> std::io::Result<fs::Metadata> {
    if follow_symlinks {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    }
}
