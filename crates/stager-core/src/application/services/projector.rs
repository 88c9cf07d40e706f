//! Directory Projector - copies matched entries into a target tree.
//!
//! The projector owns the copy primitives. Every public operation is
//! fail-fast: the first failing entry aborts the call and whatever was
//! already copied stays in place.

use std::path::Path;

use tracing::{debug, instrument, trace, warn};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{EntryDescriptor, EntryInfo, MatchSet, SourcePolicy},
    error::{StagerError, StagerResult},
};

/// Applies the flattening rule of a [`MatchSet`] through the filesystem port.
pub struct DirectoryProjector<'a> {
    filesystem: &'a dyn Filesystem,
    policy: SourcePolicy,
}

impl<'a> DirectoryProjector<'a> {
    pub fn new(filesystem: &'a dyn Filesystem, policy: SourcePolicy) -> Self {
        Self { filesystem, policy }
    }

    /// Copy every entry of `set` beneath `target_root`.
    ///
    /// Returns the number of matched entries copied (directories count once).
    #[instrument(skip_all, fields(kind = %set.kind(), target = %target_root.display()))]
    pub fn project(&self, set: &MatchSet, target_root: &Path) -> StagerResult<usize> {
        for entry in set.entries() {
            let dst = set.destination(entry, target_root);
            debug!(
                from = %entry.source.display(),
                to = %dst.display(),
                "Projecting entry"
            );
            if entry.is_directory_match {
                self.copy_dir(&entry.source, &dst)?;
            } else {
                self.copy_entry(&entry.source, &dst)?;
            }
        }
        Ok(set.len())
    }

    /// Copy one entry of any kind from `src` to `dst`.
    pub fn copy_entry(&self, src: &Path, dst: &Path) -> StagerResult<()> {
        let entry = self
            .filesystem
            .entry(src)?
            .ok_or_else(|| ApplicationError::SourceNotFound {
                path: src.to_path_buf(),
            })?;
        self.copy_described(&entry, src, dst)
    }

    /// Copy `entries` (children of `src_dir`) into `dst_dir`.
    ///
    /// Dispatch uses each descriptor's own flags, so a synthetic descriptor
    /// changes how its entry is copied.
    pub fn copy_entries<D: EntryDescriptor>(
        &self,
        entries: &[D],
        src_dir: &Path,
        dst_dir: &Path,
    ) -> StagerResult<()> {
        self.create_directory_if_absent(dst_dir)?;
        for entry in entries {
            let src = src_dir.join(entry.name());
            let dst = dst_dir.join(entry.name());
            self.copy_described(entry, &src, &dst)?;
        }
        Ok(())
    }

    /// Recursively copy the directory `src` to `dst`.
    ///
    /// A non-directory `src` is copied as a single file under the lenient
    /// policy and rejected under the strict one.
    pub fn copy_dir(&self, src: &Path, dst: &Path) -> StagerResult<()> {
        if !self.filesystem.exists(src) {
            return Err(ApplicationError::SourceNotFound {
                path: src.to_path_buf(),
            }
            .into());
        }

        if !self.filesystem.is_dir(src) {
            return match self.policy {
                SourcePolicy::Strict => Err(ApplicationError::SourceNotDirectory {
                    path: src.to_path_buf(),
                }
                .into()),
                SourcePolicy::Lenient => {
                    warn!(path = %src.display(), "Directory copy of a file, copying as a file");
                    self.copy_file(src, dst)
                }
            };
        }

        let entries = self.filesystem.read_dir(src)?;
        self.copy_entries(&entries, src, dst)
    }

    /// Copy a regular file, overwriting whatever file or link is at `dst`.
    pub fn copy_file(&self, src: &Path, dst: &Path) -> StagerResult<()> {
        self.prepare_parent(dst)?;
        match self.inspect_target(dst)? {
            Some(existing) if existing.is_dir() => {
                return Err(ApplicationError::InvalidTarget {
                    path: dst.to_path_buf(),
                    reason: "a directory occupies the file's destination".into(),
                }
                .into());
            }
            Some(existing) if existing.is_symlink() => self.filesystem.remove_file(dst)?,
            _ => {}
        }
        trace!(from = %src.display(), to = %dst.display(), "Copying file");
        self.filesystem.copy_file(src, dst)
    }

    /// Recreate the symlink `src` at `dst` with the same referent.
    pub fn copy_symlink(&self, src: &Path, dst: &Path) -> StagerResult<()> {
        let target = self
            .filesystem
            .read_link(src)
            .map_err(|e| ApplicationError::CopyFailure {
                from: src.to_path_buf(),
                to: dst.to_path_buf(),
                reason: e.root().to_string(),
            })?;

        self.prepare_parent(dst)?;
        match self.inspect_target(dst)? {
            Some(existing) if existing.is_dir() => {
                return Err(ApplicationError::InvalidTarget {
                    path: dst.to_path_buf(),
                    reason: "a directory occupies the link's destination".into(),
                }
                .into());
            }
            Some(_) => self.filesystem.remove_file(dst)?,
            None => {}
        }
        trace!(link = %dst.display(), target = %target.display(), "Recreating symlink");
        self.filesystem.create_symlink(&target, dst)
    }

    /// Create `path` and its parents unless it is already a directory.
    ///
    /// Idempotent. Fails with `InvalidTarget` when a non-directory occupies
    /// `path` or one of its ancestors, or when `path` is not a valid path
    /// on this platform.
    pub fn create_directory_if_absent(&self, path: &Path) -> StagerResult<()> {
        match self.inspect_target(path)? {
            None => self.filesystem.create_dir_all(path),
            Some(_) if self.filesystem.is_dir(path) => Ok(()),
            Some(_) => Err(ApplicationError::InvalidTarget {
                path: path.to_path_buf(),
                reason: "a non-directory entry already exists at this path".into(),
            }
            .into()),
        }
    }

    fn copy_described<D: EntryDescriptor + ?Sized>(
        &self,
        entry: &D,
        src: &Path,
        dst: &Path,
    ) -> StagerResult<()> {
        if entry.is_symlink() {
            self.copy_symlink(src, dst)
        } else if entry.is_dir() {
            self.copy_dir(src, dst)
        } else {
            self.copy_file(src, dst)
        }
    }

    /// Create an empty file at `path`, creating its parents first.
    ///
    /// An existing file is truncated; a directory at `path` is an
    /// `InvalidTarget`.
    pub fn create_file(&self, path: &Path) -> StagerResult<()> {
        self.prepare_parent(path)?;
        match self.inspect_target(path)? {
            Some(existing) if existing.is_dir() => {
                return Err(ApplicationError::InvalidTarget {
                    path: path.to_path_buf(),
                    reason: "a directory occupies the file's destination".into(),
                }
                .into());
            }
            _ => {}
        }
        trace!(path = %path.display(), "Creating empty file");
        self.filesystem.create_file(path)
    }

    /// Look up a destination path. A destination that cannot even be
    /// inspected is unusable as a target.
    fn inspect_target(&self, path: &Path) -> StagerResult<Option<EntryInfo>> {
        self.filesystem.entry(path).map_err(|e| match e {
            StagerError::Application(ApplicationError::Filesystem { path, reason }) => {
                ApplicationError::InvalidTarget { path, reason }.into()
            }
            other => other,
        })
    }

    fn prepare_parent(&self, dst: &Path) -> StagerResult<()> {
        match dst.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                self.create_directory_if_absent(parent)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::output::MockFilesystem;
    use crate::domain::{EntryInfo, MatchKind};
    use crate::error::StagerError;
    use mockall::predicate::*;
    use std::path::PathBuf;

    fn target_is_dir(fs: &mut MockFilesystem, dir: &'static str) {
        fs.expect_entry()
            .with(eq(Path::new(dir)))
            .returning(|_| Ok(Some(EntryInfo::directory("d"))));
        fs.expect_is_dir()
            .with(eq(Path::new(dir)))
            .return_const(true);
    }

    #[test]
    fn single_file_lands_under_target_root() {
        let mut fs = MockFilesystem::new();
        target_is_dir(&mut fs, "/out");
        fs.expect_entry()
            .with(eq(Path::new("/src/a/b.txt")))
            .returning(|_| Ok(Some(EntryInfo::file("b.txt", 2))));
        fs.expect_entry()
            .with(eq(Path::new("/out/b.txt")))
            .returning(|_| Ok(None));
        fs.expect_copy_file()
            .with(eq(Path::new("/src/a/b.txt")), eq(Path::new("/out/b.txt")))
            .times(1)
            .returning(|_, _| Ok(()));

        let set = MatchSet::new(MatchKind::SingleFile).with_entry(
            None,
            PathBuf::from("/src/a/b.txt"),
            false,
        );
        let copied = DirectoryProjector::new(&fs, SourcePolicy::Lenient)
            .project(&set, Path::new("/out"))
            .unwrap();
        assert_eq!(copied, 1);
    }

    #[test]
    fn strict_policy_rejects_file_as_directory() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_is_dir().return_const(false);
        fs.expect_copy_file().never();

        let err = DirectoryProjector::new(&fs, SourcePolicy::Strict)
            .copy_dir(Path::new("/src/file.txt"), Path::new("/out/file.txt"))
            .unwrap_err();
        assert!(matches!(
            err,
            StagerError::Application(ApplicationError::SourceNotDirectory { .. })
        ));
    }

    #[test]
    fn lenient_policy_copies_file_as_directory() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_is_dir()
            .with(eq(Path::new("/src/file.txt")))
            .return_const(false);
        target_is_dir(&mut fs, "/out");
        fs.expect_entry()
            .with(eq(Path::new("/out/file.txt")))
            .returning(|_| Ok(None));
        fs.expect_copy_file().times(1).returning(|_, _| Ok(()));

        DirectoryProjector::new(&fs, SourcePolicy::Lenient)
            .copy_dir(Path::new("/src/file.txt"), Path::new("/out/file.txt"))
            .unwrap();
    }

    #[test]
    fn missing_directory_source_is_not_found() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(false);

        let err = DirectoryProjector::new(&fs, SourcePolicy::Lenient)
            .copy_dir(Path::new("/gone"), Path::new("/out"))
            .unwrap_err();
        assert!(matches!(
            err,
            StagerError::Application(ApplicationError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn file_in_place_of_directory_is_invalid_target() {
        let mut fs = MockFilesystem::new();
        fs.expect_entry()
            .returning(|_| Ok(Some(EntryInfo::file("out", 1))));
        fs.expect_is_dir().return_const(false);
        fs.expect_create_dir_all().never();

        let err = DirectoryProjector::new(&fs, SourcePolicy::Lenient)
            .create_directory_if_absent(Path::new("/out"))
            .unwrap_err();
        assert!(matches!(
            err,
            StagerError::Application(ApplicationError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn existing_directory_is_left_alone() {
        let mut fs = MockFilesystem::new();
        target_is_dir(&mut fs, "/out");
        fs.expect_create_dir_all().never();

        DirectoryProjector::new(&fs, SourcePolicy::Lenient)
            .create_directory_if_absent(Path::new("/out"))
            .unwrap();
    }

    #[test]
    fn symlink_is_recreated_not_followed() {
        let mut fs = MockFilesystem::new();
        target_is_dir(&mut fs, "/out");
        fs.expect_read_link()
            .returning(|_| Ok(PathBuf::from("real.txt")));
        fs.expect_entry()
            .with(eq(Path::new("/out/link")))
            .returning(|_| Ok(None));
        fs.expect_copy_file().never();
        fs.expect_create_symlink()
            .with(eq(Path::new("real.txt")), eq(Path::new("/out/link")))
            .times(1)
            .returning(|_, _| Ok(()));

        DirectoryProjector::new(&fs, SourcePolicy::Lenient)
            .copy_symlink(Path::new("/src/link"), Path::new("/out/link"))
            .unwrap();
    }

    /// Reports itself as a symlink whatever the underlying entry is.
    struct ForcedSymlink(EntryInfo);

    impl EntryDescriptor for ForcedSymlink {
        fn name(&self) -> &str {
            self.0.name()
        }
        fn size(&self) -> u64 {
            self.0.size()
        }
        fn modified(&self) -> Option<std::time::SystemTime> {
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
    fn synthetic_descriptor_drives_dispatch() {
        let mut fs = MockFilesystem::new();
        target_is_dir(&mut fs, "/out");
        fs.expect_read_link()
            .with(eq(Path::new("/src/plain.txt")))
            .times(1)
            .returning(|_| Ok(PathBuf::from("elsewhere")));
        fs.expect_entry()
            .with(eq(Path::new("/out/plain.txt")))
            .returning(|_| Ok(None));
        fs.expect_copy_file().never();
        fs.expect_create_symlink().times(1).returning(|_, _| Ok(()));

        let entries = [ForcedSymlink(EntryInfo::file("plain.txt", 4))];
        DirectoryProjector::new(&fs, SourcePolicy::Lenient)
            .copy_entries(&entries, Path::new("/src"), Path::new("/out"))
            .unwrap();
    }

    #[test]
    fn unreadable_link_is_copy_failure() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_link().returning(|p| {
            Err(ApplicationError::Filesystem {
                path: p.to_path_buf(),
                reason: "not a symlink".into(),
            }
            .into())
        });
        fs.expect_create_symlink().never();

        let err = DirectoryProjector::new(&fs, SourcePolicy::Lenient)
            .copy_symlink(Path::new("/src/a"), Path::new("/out/a"))
            .unwrap_err();
        assert!(matches!(
            err,
            StagerError::Application(ApplicationError::CopyFailure { .. })
        ));
    }

    #[test]
    fn first_failure_aborts_projection() {
        let mut fs = MockFilesystem::new();
        target_is_dir(&mut fs, "/out");
        fs.expect_entry()
            .with(eq(Path::new("/src/a.txt")))
            .returning(|_| Ok(Some(EntryInfo::file("a.txt", 1))));
        fs.expect_entry()
            .with(eq(Path::new("/out/a.txt")))
            .returning(|_| Ok(None));
        fs.expect_copy_file().times(1).returning(|from, to| {
            Err(ApplicationError::CopyFailure {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                reason: "locked".into(),
            }
            .into())
        });

        let set = MatchSet::new(MatchKind::FlattenedWildcard)
            .with_entry(None, PathBuf::from("/src/a.txt"), false)
            .with_entry(None, PathBuf::from("/src/b.txt"), false);
        let err = DirectoryProjector::new(&fs, SourcePolicy::Lenient)
            .project(&set, Path::new("/out"))
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn unreadable_target_path_is_invalid_target() {
        let mut fs = MockFilesystem::new();
        fs.expect_entry().returning(|path| {
            Err(ApplicationError::Filesystem {
                path: path.to_path_buf(),
                reason: "file name contained an unexpected NUL byte".into(),
            }
            .into())
        });
        fs.expect_create_dir_all().never();

        let err = DirectoryProjector::new(&fs, SourcePolicy::Lenient)
            .create_directory_if_absent(Path::new("/bad\0dir/out"))
            .unwrap_err();
        assert!(matches!(
            err,
            StagerError::Application(ApplicationError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn create_file_prepares_parent() {
        let mut fs = MockFilesystem::new();
        fs.expect_entry()
            .with(eq(Path::new("/out/META-INF")))
            .returning(|_| Ok(None));
        fs.expect_create_dir_all()
            .with(eq(Path::new("/out/META-INF")))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_entry()
            .with(eq(Path::new("/out/META-INF/MANIFEST.MF")))
            .returning(|_| Ok(None));
        fs.expect_create_file()
            .with(eq(Path::new("/out/META-INF/MANIFEST.MF")))
            .times(1)
            .returning(|_| Ok(()));

        DirectoryProjector::new(&fs, SourcePolicy::Lenient)
            .create_file(Path::new("/out/META-INF/MANIFEST.MF"))
            .unwrap();
    }

    #[test]
    fn create_file_over_directory_is_rejected() {
        let mut fs = MockFilesystem::new();
        target_is_dir(&mut fs, "/out");
        fs.expect_entry()
            .with(eq(Path::new("/out/taken")))
            .returning(|_| Ok(Some(EntryInfo::directory("taken"))));
        fs.expect_create_file().never();

        let err = DirectoryProjector::new(&fs, SourcePolicy::Lenient)
            .create_file(Path::new("/out/taken"))
            .unwrap_err();
        assert!(matches!(
            err,
            StagerError::Application(ApplicationError::InvalidTarget { .. })
        ));
    }
}
