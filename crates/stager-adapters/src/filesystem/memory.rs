//! In-memory filesystem adapter for testing.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::SystemTime,
};

use glob::MatchOptions;

use stager_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::{DomainError, EntryInfo},
    error::{StagerError, StagerResult},
};

/// Symlink hops followed before giving up on a cycle.
const MAX_LINK_DEPTH: usize = 8;

/// Permission bits given to files created without an explicit mode.
const DEFAULT_FILE_MODE: u32 = 0o644;

/// In-memory filesystem for testing.
///
/// Cloning shares the underlying tree, so a test can hand one clone to a
/// service and inspect the result through another.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    nodes: BTreeMap<PathBuf, Node>,
}

#[derive(Debug, Clone)]
enum Node {
    File {
        content: Vec<u8>,
        mode: u32,
        modified: SystemTime,
    },
    Directory,
    Symlink {
        target: PathBuf,
    },
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Add a file, creating missing parent directories (testing helper).
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) {
        self.add_file_with_mode(path, content, DEFAULT_FILE_MODE);
    }

    /// Add a file with explicit permission bits.
    pub fn add_file_with_mode(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>, mode: u32) {
        let path = path.as_ref();
        let mut inner = self.write_lossy();
        inner.insert_parents(path);
        inner.nodes.insert(
            path.to_path_buf(),
            Node::File {
                content: content.as_ref().to_vec(),
                mode,
                modified: SystemTime::now(),
            },
        );
    }

    /// Add a directory and its parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut inner = self.write_lossy();
        inner.insert_parents(path);
        inner.nodes.insert(path.to_path_buf(), Node::Directory);
    }

    /// Add a symlink at `link` pointing at `target`.
    pub fn add_symlink(&self, target: impl AsRef<Path>, link: impl AsRef<Path>) {
        let link = link.as_ref();
        let mut inner = self.write_lossy();
        inner.insert_parents(link);
        inner.nodes.insert(
            link.to_path_buf(),
            Node::Symlink {
                target: target.as_ref().to_path_buf(),
            },
        );
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<Vec<u8>> {
        match self.read_lossy().nodes.get(path) {
            Some(Node::File { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }

    /// Permission bits of a file.
    pub fn mode(&self, path: &Path) -> Option<u32> {
        match self.read_lossy().nodes.get(path) {
            Some(Node::File { mode, .. }) => Some(*mode),
            _ => None,
        }
    }

    /// Target of a symlink.
    pub fn link_target(&self, path: &Path) -> Option<PathBuf> {
        match self.read_lossy().nodes.get(path) {
            Some(Node::Symlink { target }) => Some(target.clone()),
            _ => None,
        }
    }

    /// List all files and symlinks.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.read_lossy()
            .nodes
            .iter()
            .filter(|(_, node)| !matches!(node, Node::Directory))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Every file and symlink beneath `root`, as `/`-joined relative paths.
    pub fn list_files_under(&self, root: &Path) -> Vec<String> {
        self.list_files()
            .into_iter()
            .filter_map(|p| {
                p.strip_prefix(root).ok().map(|rel| {
                    rel.components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect::<Vec<_>>()
                        .join("/")
                })
            })
            .collect()
    }

    /// Clear all contents.
    pub fn clear(&self) {
        self.write_lossy().nodes.clear();
    }

    fn read_lossy(&self) -> RwLockReadGuard<'_, MemoryFilesystemInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lossy(&self) -> RwLockWriteGuard<'_, MemoryFilesystemInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFilesystemInner {
    fn insert_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Directory);
        }
    }

    /// Follow symlinks at `path` until a non-link node (or nothing) is found.
    fn resolve(&self, path: &Path) -> Option<(PathBuf, &Node)> {
        let mut current = path.to_path_buf();
        for _ in 0..=MAX_LINK_DEPTH {
            match self.nodes.get(&current)? {
                Node::Symlink { target } => {
                    current = match current.parent() {
                        Some(parent) if target.is_relative() => parent.join(target),
                        _ => target.clone(),
                    };
                }
                node => return Some((current, node)),
            }
        }
        None
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some((_, Node::Directory)))
    }

    fn require_parent_dir(&self, path: &Path) -> Result<(), String> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.is_dir(parent) => {
                Err(format!("Parent directory does not exist: {}", parent.display()))
            }
            _ => Ok(()),
        }
    }
}

fn describe(path: &Path, node: &Node) -> EntryInfo {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    match node {
        Node::File {
            content,
            mode,
            modified,
        } => EntryInfo::file(name, content.len() as u64)
            .with_mode(*mode)
            .with_modified(*modified),
        Node::Directory => EntryInfo::directory(name),
        Node::Symlink { .. } => EntryInfo::symlink(name),
    }
}

fn fs_error(path: &Path, reason: impl Into<String>) -> StagerError {
    ApplicationError::Filesystem {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
    .into()
}

impl Filesystem for MemoryFilesystem {
    fn entry(&self, path: &Path) -> StagerResult<Option<EntryInfo>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.nodes.get(path).map(|node| describe(path, node)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.read().map(|inner| inner.is_dir(path)).unwrap_or(false)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.nodes.contains_key(path))
            .unwrap_or(false)
    }

    fn read_dir(&self, path: &Path) -> StagerResult<Vec<EntryInfo>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let dir = match inner.resolve(path) {
            Some((dir, Node::Directory)) => dir,
            Some(_) => return Err(fs_error(path, "Not a directory")),
            None => return Err(fs_error(path, "No such directory")),
        };

        Ok(inner
            .nodes
            .range(dir.clone()..)
            .take_while(|(p, _)| p.starts_with(&dir))
            .filter(|(p, _)| p.parent() == Some(dir.as_path()))
            .map(|(p, node)| describe(p, node))
            .collect())
    }

    fn glob(&self, pattern: &str) -> StagerResult<Vec<PathBuf>> {
        let compiled = glob::Pattern::new(pattern).map_err(|e| {
            StagerError::from(DomainError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.msg.to_string(),
            })
        })?;
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner
            .nodes
            .keys()
            .filter(|p| compiled.matches_path_with(p, options))
            .cloned()
            .collect())
    }

    fn create_dir_all(&self, path: &Path) -> StagerResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let mut chain: Vec<&Path> = path
            .ancestors()
            .filter(|a| !a.as_os_str().is_empty())
            .collect();
        chain.reverse();

        for dir in chain {
            if inner.nodes.contains_key(dir) {
                if !inner.is_dir(dir) {
                    return Err(ApplicationError::InvalidTarget {
                        path: path.to_path_buf(),
                        reason: format!("{} exists and is not a directory", dir.display()),
                    }
                    .into());
                }
            } else {
                inner.nodes.insert(dir.to_path_buf(), Node::Directory);
            }
        }
        Ok(())
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> StagerResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let failure = |reason: String| -> StagerError {
            ApplicationError::CopyFailure {
                from: src.to_path_buf(),
                to: dst.to_path_buf(),
                reason,
            }
            .into()
        };

        let (content, mode) = match inner.resolve(src) {
            Some((_, Node::File { content, mode, .. })) => (content.clone(), *mode),
            Some(_) => return Err(failure("Source is not a regular file".into())),
            None => return Err(failure("No such file".into())),
        };
        inner.require_parent_dir(dst).map_err(failure)?;
        if inner.is_dir(dst) {
            return Err(failure("Destination is a directory".into()));
        }

        inner.nodes.insert(
            dst.to_path_buf(),
            Node::File {
                content,
                mode,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn read_link(&self, path: &Path) -> StagerResult<PathBuf> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        match inner.nodes.get(path) {
            Some(Node::Symlink { target }) => Ok(target.clone()),
            Some(_) => Err(fs_error(path, "Not a symlink")),
            None => Err(fs_error(path, "No such file")),
        }
    }

    fn create_symlink(&self, target: &Path, link: &Path) -> StagerResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let failure = |reason: String| -> StagerError {
            ApplicationError::CopyFailure {
                from: target.to_path_buf(),
                to: link.to_path_buf(),
                reason,
            }
            .into()
        };

        inner.require_parent_dir(link).map_err(failure)?;
        if inner.nodes.contains_key(link) {
            return Err(failure("File exists".into()));
        }
        inner.nodes.insert(
            link.to_path_buf(),
            Node::Symlink {
                target: target.to_path_buf(),
            },
        );
        Ok(())
    }

    fn create_file(&self, path: &Path) -> StagerResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner
            .require_parent_dir(path)
            .map_err(|reason| fs_error(path, reason))?;
        if inner.is_dir(path) {
            return Err(fs_error(path, "Is a directory"));
        }
        inner.nodes.insert(
            path.to_path_buf(),
            Node::File {
                content: Vec::new(),
                mode: DEFAULT_FILE_MODE,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> StagerResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        match inner.nodes.get(path) {
            Some(Node::Directory) => Err(fs_error(path, "Is a directory")),
            Some(_) => {
                inner.nodes.remove(path);
                Ok(())
            }
            None => Err(fs_error(path, "No such file")),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> StagerResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        if !matches!(inner.nodes.get(path), Some(Node::Directory)) {
            return Err(fs_error(path, "Not a directory"));
        }
        inner.nodes.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}
