//! Pattern Matcher - expands one pattern against one source root.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{EntryDescriptor, MatchKind, MatchSet, Pattern, PatternKind},
    error::StagerResult,
};

/// Resolves patterns into [`MatchSet`]s through the filesystem port.
pub struct PatternMatcher<'a> {
    filesystem: &'a dyn Filesystem,
}

impl<'a> PatternMatcher<'a> {
    pub fn new(filesystem: &'a dyn Filesystem) -> Self {
        Self { filesystem }
    }

    /// Resolve `pattern` against `source_root`.
    ///
    /// A pattern that matches nothing yields an empty set; only a missing
    /// source root is an error. Matches come back in glob traversal order.
    #[instrument(
        skip_all,
        fields(source = %source_root.display(), pattern = %pattern)
    )]
    pub fn resolve(&self, source_root: &Path, pattern: &Pattern) -> StagerResult<MatchSet> {
        if !self.filesystem.exists(source_root) {
            return Err(ApplicationError::SourceNotFound {
                path: source_root.to_path_buf(),
            }
            .into());
        }

        let set = match pattern.kind() {
            PatternKind::WholeTree => MatchSet::new(MatchKind::WholeTree).with_entry(
                None,
                source_root.to_path_buf(),
                self.filesystem.is_dir(source_root),
            ),

            PatternKind::DirectoryContents { glob } => {
                let mut set = MatchSet::new(MatchKind::DirectoryContents);
                for dir in self.expand(source_root, glob)? {
                    if !self.filesystem.is_dir(&dir) {
                        debug!(path = %dir.display(), "Skipping non-directory match");
                        continue;
                    }
                    for child in self.filesystem.read_dir(&dir)? {
                        let source = dir.join(child.name());
                        set.push(Some(&dir), source, child.is_dir());
                    }
                }
                set
            }

            PatternKind::Entries { glob, literal } => {
                let matches = self.expand(source_root, glob)?;
                let mut described = Vec::with_capacity(matches.len());
                for path in matches {
                    let is_dir = self
                        .filesystem
                        .entry(&path)?
                        .is_some_and(|e| e.is_dir());
                    described.push((path, is_dir));
                }

                let kind = match described.as_slice() {
                    [(_, false)] if *literal => MatchKind::SingleFile,
                    _ => MatchKind::FlattenedWildcard,
                };
                let mut set = MatchSet::new(kind);
                for (path, is_dir) in described {
                    set.push(None, path, is_dir);
                }
                set
            }
        };

        debug!(kind = %set.kind(), matches = set.len(), "Pattern resolved");
        Ok(set)
    }

    /// Glob `pattern` beneath `root`, treating the root itself literally.
    fn expand(&self, root: &Path, pattern: &str) -> StagerResult<Vec<PathBuf>> {
        let escaped = glob::Pattern::escape(&root.to_string_lossy());
        let full = format!("{}/{}", escaped.trim_end_matches(['/', '\\']), pattern);
        self.filesystem.glob(&full)
    }
}
