//! Resolved pattern matches and the flattening rule.
//!
//! A [`MatchSet`] is what one pattern produced against one source root. Every
//! entry already carries its relative identity, so computing where it lands
//! in the target is pure and can be checked without touching disk.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::path_resolver;

/// How a pattern's matches are laid out in the target.
///
/// | Kind                | Lands at                                    |
/// |---------------------|---------------------------------------------|
/// | `SingleFile`        | `target/<file name>`                        |
/// | `WholeTree`         | `target/<source root name>/...`             |
/// | `DirectoryContents` | `target/<path below the matched directory>` |
/// | `FlattenedWildcard` | `target/<matched entry name>/...`           |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    SingleFile,
    WholeTree,
    DirectoryContents,
    FlattenedWildcard,
}

impl MatchKind {
    /// Directory that relative paths are measured from.
    ///
    /// For `DirectoryContents` the entry is a child of the matched directory
    /// and the matched directory is the anchor, which drops its own name.
    /// For every other kind the anchor is the entry's parent, which keeps
    /// only the entry's own name and discards everything above it.
    pub fn anchor<'a>(&self, matched_dir: Option<&'a Path>, entry: &'a Path) -> &'a Path {
        match self {
            Self::DirectoryContents => matched_dir
                .or_else(|| entry.parent())
                .unwrap_or(entry),
            Self::SingleFile | Self::WholeTree | Self::FlattenedWildcard => {
                entry.parent().unwrap_or(entry)
            }
        }
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleFile => write!(f, "single-file"),
            Self::WholeTree => write!(f, "whole-tree"),
            Self::DirectoryContents => write!(f, "directory-contents"),
            Self::FlattenedWildcard => write!(f, "flattened-wildcard"),
        }
    }
}

/// One unit of copying: a file, symlink, or directory copied recursively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedEntry {
    /// Absolute source path.
    pub source: PathBuf,
    /// `/`-rooted path relative to the match's anchor.
    pub relative: String,
    /// Directory entries are copied recursively beneath their destination.
    pub is_directory_match: bool,
}

/// Ordered matches of one pattern against one source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSet {
    kind: MatchKind,
    entries: Vec<MatchedEntry>,
}

impl MatchSet {
    pub fn new(kind: MatchKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Record a match, computing its relative identity from the kind's anchor.
    ///
    /// `matched_dir` is the directory the pattern matched for
    /// `DirectoryContents`; it is ignored for other kinds.
    pub fn push(&mut self, matched_dir: Option<&Path>, source: PathBuf, is_directory: bool) {
        let anchor = self.kind.anchor(matched_dir, &source);
        let relative = path_resolver::relative_path(anchor, &source);
        self.entries.push(MatchedEntry {
            source,
            relative,
            is_directory_match: is_directory,
        });
    }

    pub fn with_entry(mut self, matched_dir: Option<&Path>, source: PathBuf, is_directory: bool) -> Self {
        self.push(matched_dir, source, is_directory);
        self
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    pub fn entries(&self) -> &[MatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Where `entry` lands under `target_root`.
    pub fn destination(&self, entry: &MatchedEntry, target_root: &Path) -> PathBuf {
        path_resolver::destination(target_root, &entry.relative)
    }

    /// Every `(source, destination)` pair, in match order.
    pub fn plan(&self, target_root: &Path) -> Vec<(PathBuf, PathBuf)> {
        self.entries
            .iter()
            .map(|e| (e.source.clone(), self.destination(e, target_root)))
            .collect()
    }
}
