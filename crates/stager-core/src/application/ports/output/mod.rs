//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stager-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::{ArchiveSettings, EntryInfo};
use crate::error::StagerResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `stager_adapters::filesystem::LocalFilesystem` (production)
/// - `stager_adapters::filesystem::MemoryFilesystem` (testing)
///
/// ## Design Notes
///
/// - `entry` never follows symlinks; `is_dir` does
/// - Listing and globbing return entries sorted by name so results are
///   deterministic for a given filesystem state
/// - Error variants carry the offending path
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Describe the entry at `path` without following symlinks.
    /// `Ok(None)` when nothing exists there.
    fn entry(&self, path: &Path) -> StagerResult<Option<EntryInfo>>;

    /// `true` if `path` is a directory, following symlinks.
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path exists (a dangling symlink counts).
    fn exists(&self, path: &Path) -> bool;

    /// Immediate children of a directory, sorted by name.
    fn read_dir(&self, path: &Path) -> StagerResult<Vec<EntryInfo>>;

    /// Expand an absolute glob pattern. Results are sorted.
    fn glob(&self, pattern: &str) -> StagerResult<Vec<PathBuf>>;

    /// Create a directory and all parent directories.
    ///
    /// Fails with `InvalidTarget` when a non-directory is in the way.
    fn create_dir_all(&self, path: &Path) -> StagerResult<()>;

    /// Copy a regular file byte-for-byte, preserving permission bits and
    /// overwriting an existing file at `dst`.
    fn copy_file(&self, src: &Path, dst: &Path) -> StagerResult<()>;

    /// Target of the symlink at `path`.
    fn read_link(&self, path: &Path) -> StagerResult<PathBuf>;

    /// Create a symlink at `link` pointing at `target`.
    fn create_symlink(&self, target: &Path, link: &Path) -> StagerResult<()>;

    /// Create (or truncate) an empty file.
    fn create_file(&self, path: &Path) -> StagerResult<()>;

    /// Remove a file or symlink.
    fn remove_file(&self, path: &Path) -> StagerResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> StagerResult<()>;
}

/// Summary of a written archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    pub path: PathBuf,
    /// Number of records written (files, directories and symlinks).
    pub entries: usize,
}

/// Port for archive serialization.
///
/// Implemented by:
/// - `stager_adapters::archive::ZipArchiver` (ZIP container)
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveWriter: Send + Sync {
    /// Serialize `source` into a single archive at `archive`.
    ///
    /// # Contract
    ///
    /// * Missing `source`: `SourceNotFound`, `archive` untouched
    /// * `source` is a file: single-entry archive
    /// * `archive` is a directory or its parent is unusable: `ArchiveCreation`
    /// * Existing archive is replaced; a failed write leaves nothing behind
    fn write(
        &self,
        source: &Path,
        archive: &Path,
        settings: &ArchiveSettings,
    ) -> StagerResult<ArchiveReport>;
}
