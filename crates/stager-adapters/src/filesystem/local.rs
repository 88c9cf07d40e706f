//! Local filesystem adapter using std::fs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;

use stager_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::{DomainError, EntryDescriptor, EntryInfo},
    error::{StagerError, StagerResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn entry(&self, path: &Path) -> StagerResult<Option<EntryInfo>> {
        match fs::symlink_metadata(path) {
            Ok(metadata) => Ok(Some(EntryInfo::from_metadata(entry_name(path), &metadata))),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(map_io_error(path, e, "read metadata")),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn read_dir(&self, path: &Path) -> StagerResult<Vec<EntryInfo>> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(path).map_err(|e| map_io_error(path, e, "read directory"))? {
            let dir_entry = dir_entry.map_err(|e| map_io_error(path, e, "read directory entry"))?;
            // DirEntry::metadata does not traverse symlinks.
            let metadata = dir_entry
                .metadata()
                .map_err(|e| map_io_error(&dir_entry.path(), e, "read metadata"))?;
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            entries.push(EntryInfo::from_metadata(name, &metadata));
        }
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(entries)
    }

    fn glob(&self, pattern: &str) -> StagerResult<Vec<PathBuf>> {
        let paths = glob::glob(pattern).map_err(|e| {
            StagerError::from(DomainError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.msg.to_string(),
            })
        })?;

        let mut matches = Vec::new();
        for path in paths {
            let path = path.map_err(|e| {
                let at = e.path().to_path_buf();
                map_io_error(&at, io::Error::from(e), "expand pattern")
            })?;
            matches.push(path);
        }
        matches.sort();
        trace!(pattern, matches = matches.len(), "Glob expanded");
        Ok(matches)
    }

    fn create_dir_all(&self, path: &Path) -> StagerResult<()> {
        fs::create_dir_all(path).map_err(|e| {
            ApplicationError::InvalidTarget {
                path: path.to_path_buf(),
                reason: format!("Failed to create directory: {e}"),
            }
            .into()
        })
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> StagerResult<()> {
        // std::fs::copy carries the permission bits across.
        fs::copy(src, dst).map(|_| ()).map_err(|e| {
            ApplicationError::CopyFailure {
                from: src.to_path_buf(),
                to: dst.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn read_link(&self, path: &Path) -> StagerResult<PathBuf> {
        fs::read_link(path).map_err(|e| map_io_error(path, e, "read symlink"))
    }

    fn create_symlink(&self, target: &Path, link: &Path) -> StagerResult<()> {
        symlink(target, link).map_err(|e| {
            ApplicationError::CopyFailure {
                from: target.to_path_buf(),
                to: link.to_path_buf(),
                reason: format!("Failed to create symlink: {e}"),
            }
            .into()
        })
    }

    fn create_file(&self, path: &Path) -> StagerResult<()> {
        fs::File::create(path)
            .map(drop)
            .map_err(|e| map_io_error(path, e, "create file"))
    }

    fn remove_file(&self, path: &Path) -> StagerResult<()> {
        fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn remove_dir_all(&self, path: &Path) -> StagerResult<()> {
        fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    let resolved = match link.parent() {
        Some(parent) if target.is_relative() => parent.join(target),
        _ => target.to_path_buf(),
    };
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> StagerError {
    ApplicationError::Filesystem {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stager_core::domain::EntryKind;
    use tempfile::TempDir;

    #[test]
    fn missing_entry_is_none() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        assert!(fs.entry(&temp.path().join("nope")).unwrap().is_none());
        assert!(!fs.exists(&temp.path().join("nope")));
    }

    #[test]
    fn read_dir_is_sorted() {
        let temp = TempDir::new().unwrap();
        for name in ["b.txt", "a.txt", "c"] {
            std::fs::write(temp.path().join(name), name).unwrap();
        }
        let names: Vec<String> = LocalFilesystem::new()
            .read_dir(temp.path())
            .unwrap()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c"]);
    }

    #[test]
    fn create_dir_all_through_a_file_is_invalid_target() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let err = LocalFilesystem::new()
            .create_dir_all(&blocker.join("child"))
            .unwrap_err();
        assert!(matches!(
            err,
            StagerError::Application(ApplicationError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn malformed_glob_is_invalid_pattern() {
        let err = LocalFilesystem::new().glob("/tmp/[a,b").unwrap_err();
        assert!(matches!(
            err,
            StagerError::Domain(DomainError::InvalidPattern { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_is_described_without_following() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("real")).unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink("real", &link).unwrap();

        let fs = LocalFilesystem::new();
        let info = fs.entry(&link).unwrap().unwrap();
        assert_eq!(info.kind(), EntryKind::Symlink);
        assert!(fs.is_dir(&link));
        assert_eq!(fs.read_link(&link).unwrap(), PathBuf::from("real"));
    }

    #[cfg(unix)]
    #[test]
    fn copy_file_preserves_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("run.sh");
        std::fs::write(&src, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o750)).unwrap();

        let dst = temp.path().join("copy.sh");
        LocalFilesystem::new().copy_file(&src, &dst).unwrap();

        let mode = std::fs::metadata(&dst).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o750);
        assert_eq!(std::fs::read(&dst).unwrap(), b"#!/bin/sh\n");
    }
}
