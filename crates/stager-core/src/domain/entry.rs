//! Filesystem entry descriptors.
//!
//! The copy primitives never look at `std::fs::Metadata` directly. They work
//! against [`EntryDescriptor`], which adapters implement from real lookups
//! and tests implement with synthetic values.

use std::fs::Metadata;
use std::time::SystemTime;

use serde::Serialize;

/// Capability set the projector needs from a filesystem entry.
pub trait EntryDescriptor {
    /// Final path component (file or directory name).
    fn name(&self) -> &str;

    /// Size in bytes; zero for directories and symlinks.
    fn size(&self) -> u64;

    /// Last modification time, when the platform reports one.
    fn modified(&self) -> Option<SystemTime>;

    fn is_dir(&self) -> bool;

    /// `true` for the link itself, regardless of what it points at.
    fn is_symlink(&self) -> bool;
}

/// What kind of entry an [`EntryInfo`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// Owned snapshot of an entry's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    name: String,
    kind: EntryKind,
    size: u64,
    modified: Option<SystemTime>,
    mode: Option<u32>,
}

impl EntryInfo {
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self::new(name, EntryKind::File, size)
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::Directory, 0)
    }

    pub fn symlink(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::Symlink, 0)
    }

    fn new(name: impl Into<String>, kind: EntryKind, size: u64) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
            modified: None,
            mode: None,
        }
    }

    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Build from metadata obtained with `symlink_metadata` (links not followed).
    pub fn from_metadata(name: impl Into<String>, metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let size = if kind == EntryKind::File {
            metadata.len()
        } else {
            0
        };

        let mut info = Self::new(name, kind, size);
        info.modified = metadata.modified().ok();
        info.mode = unix_mode(metadata);
        info
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Unix permission bits, if known.
    pub fn mode(&self) -> Option<u32> {
        self.mode
    }
}

impl EntryDescriptor for EntryInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }
}

#[cfg(unix)]
fn unix_mode(metadata: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn unix_mode(_metadata: &Metadata) -> Option<u32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_kind() {
        assert!(EntryInfo::directory("d").is_dir());
        assert!(EntryInfo::symlink("l").is_symlink());
        let f = EntryInfo::file("f.txt", 12);
        assert!(!f.is_dir() && !f.is_symlink());
        assert_eq!(f.size(), 12);
        assert_eq!(f.name(), "f.txt");
    }

    #[test]
    fn symlink_is_not_a_directory() {
        let link = EntryInfo::symlink("to-dir");
        assert!(!link.is_dir());
    }

    /// Overrides one capability of a real descriptor, the way tests force a
    /// symlink classification without touching the filesystem.
    struct ForcedSymlink(EntryInfo);

    impl EntryDescriptor for ForcedSymlink {
        fn name(&self) -> &str {
            self.0.name()
        }
        fn size(&self) -> u64 {
            self.0.size()
        }
        fn modified(&self) -> Option<SystemTime> {
            self.0.modified()
        }
        fn is_dir(&self) -> bool {
            self.0.is_dir()
        }
        fn is_symlink(&self) -> bool {
            true
        }
    }

    #[test]
    fn descriptors_substitute_through_the_trait() {
        let entries: Vec<Box<dyn EntryDescriptor>> = vec![
            Box::new(EntryInfo::file("a.txt", 1)),
            Box::new(ForcedSymlink(EntryInfo::file("b.txt", 1))),
        ];
        let links: Vec<&str> = entries
            .iter()
            .filter(|e| e.is_symlink())
            .map(|e| e.name())
            .collect();
        assert_eq!(links, vec!["b.txt"]);
    }
}
