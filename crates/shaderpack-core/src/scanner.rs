//! Recursive file discovery
//!
//! Walks a directory tree depth-first and collects every file whose full path
//! matches a regular expression. Directories are always descended into and are
//! never part of the result.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

/// Default recursion limit, far deeper than any real asset tree
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("directory cycle detected at {0}")]
    Cycle(PathBuf),

    #[error("maximum depth {max_depth} exceeded at {path}")]
    DepthExceeded { path: PathBuf, max_depth: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    fn io(path: &Path, source: io::Error) -> Self {
        ScanError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Whether a listed entry is descended into or tested against the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A single directory listing entry
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Traversal options
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
    /// Maximum nesting below the root before the scan fails
    pub max_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Depth-first directory scanner with a path filter
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    filter: Regex,
    options: ScanOptions,
}

impl DirectoryScanner {
    pub fn new(filter: Regex) -> Self {
        Self {
            filter,
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Scan `root` and return every matching file
    pub fn scan(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let mut files = Vec::new();
        self.scan_into(root, &mut files)?;
        Ok(files)
    }

    /// Scan `root`, appending matches to an existing accumulator
    ///
    /// Entries inside one directory are visited in file name order, so the
    /// result is stable across filesystems. On error the accumulator may hold
    /// a partial result.
    pub fn scan_into(&self, root: &Path, files: &mut Vec<PathBuf>) -> Result<(), ScanError> {
        let metadata = fs::metadata(root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ScanError::NotFound(root.to_path_buf()),
            _ => ScanError::io(root, e),
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let before = files.len();
        let mut ancestors = HashSet::new();
        self.walk(root, 0, &mut ancestors, files)?;

        log::debug!(
            "Scanned {:?}: {} matching files",
            root,
            files.len() - before
        );
        Ok(())
    }

    fn walk(
        &self,
        dir: &Path,
        depth: usize,
        ancestors: &mut HashSet<PathBuf>,
        files: &mut Vec<PathBuf>,
    ) -> Result<(), ScanError> {
        if depth > self.options.max_depth {
            return Err(ScanError::DepthExceeded {
                path: dir.to_path_buf(),
                max_depth: self.options.max_depth,
            });
        }

        // Only directories on the current path count, so two links to the
        // same sibling directory are walked twice rather than rejected.
        let real = dir.canonicalize().map_err(|e| ScanError::io(dir, e))?;
        if !ancestors.insert(real.clone()) {
            return Err(ScanError::Cycle(dir.to_path_buf()));
        }

        for entry in self.list(dir)? {
            match entry.kind {
                EntryKind::Directory => self.walk(&entry.path, depth + 1, ancestors, files)?,
                EntryKind::File => {
                    if self.filter.is_match(&entry.path.to_string_lossy()) {
                        files.push(entry.path);
                    }
                }
            }
        }

        ancestors.remove(&real);
        Ok(())
    }

    /// List one directory, sorted by file name
    fn list(&self, dir: &Path) -> Result<Vec<FileEntry>, ScanError> {
        let reader = fs::read_dir(dir).map_err(|e| ScanError::io(dir, e))?;

        let mut entries = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|e| ScanError::io(dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| ScanError::io(&path, e))?;

            let is_dir = if file_type.is_symlink() {
                if !self.options.follow_symlinks {
                    false
                } else {
                    match fs::metadata(&path) {
                        Ok(target) => target.is_dir(),
                        Err(e) => {
                            log::warn!("Skipping broken symlink {:?}: {}", path, e);
                            continue;
                        }
                    }
                }
            } else {
                file_type.is_dir()
            };

            let kind = if is_dir {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(FileEntry { path, kind });
        }

        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(entries)
    }
}

/// Collect every file under `dir` whose path matches `filter` into `files`
///
/// Uses default [`ScanOptions`].
pub fn files_in_directory(
    dir: &Path,
    filter: &Regex,
    files: &mut Vec<PathBuf>,
) -> Result<(), ScanError> {
    DirectoryScanner::new(filter.clone()).scan_into(dir, files)
}
