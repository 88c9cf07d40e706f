//! Inclusion patterns.
//!
//! A [`Pattern`] is parsed once into a [`PatternKind`]; the matcher and the
//! projector branch on that kind instead of re-inspecting the raw string.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Shape of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternKind {
    /// `.`: the whole source root, including its own directory name.
    WholeTree,
    /// Ends in a separator: the contents of every matched directory.
    DirectoryContents { glob: String },
    /// Anything else: every matched entry, kept under its own name.
    Entries { glob: String, literal: bool },
}

/// A validated inclusion pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    kind: PatternKind,
}

impl Pattern {
    /// Parse and validate a pattern string.
    ///
    /// Leading `./` segments are dropped, so `./deep/*` and `deep/*` are the
    /// same pattern. Absolute patterns are rejected: every pattern is
    /// evaluated relative to a source root.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.trim().is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if raw.starts_with('/') || raw.starts_with('\\') || has_drive_prefix(raw) {
            return Err(invalid("absolute patterns are not allowed"));
        }

        let mut body = raw;
        while let Some(rest) = body.strip_prefix("./").or_else(|| body.strip_prefix(".\\")) {
            body = rest.trim_start_matches(['/', '\\']);
        }

        if body.is_empty() || body == "." {
            return Ok(Self {
                raw: raw.to_string(),
                kind: PatternKind::WholeTree,
            });
        }

        let trailing = body.ends_with(['/', '\\']);
        let glob = body.trim_end_matches(['/', '\\']).to_string();
        if glob.is_empty() || glob == "." {
            return Ok(Self {
                raw: raw.to_string(),
                kind: PatternKind::WholeTree,
            });
        }

        glob::Pattern::new(&glob).map_err(|e| invalid(e.msg))?;

        let kind = if trailing {
            PatternKind::DirectoryContents { glob }
        } else {
            let literal = !is_wildcard(&glob);
            PatternKind::Entries { glob, literal }
        };

        Ok(Self {
            raw: raw.to_string(),
            kind,
        })
    }

    /// Parse a whole list, failing on the first invalid entry.
    pub fn parse_all<S: AsRef<str>>(raws: &[S]) -> Result<Vec<Self>, DomainError> {
        raws.iter().map(|r| Self::parse(r.as_ref())).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    /// The glob portion, relative to a source root. `None` for `.`.
    pub fn glob(&self) -> Option<&str> {
        match &self.kind {
            PatternKind::WholeTree => None,
            PatternKind::DirectoryContents { glob } | PatternKind::Entries { glob, .. } => {
                Some(glob)
            }
        }
    }
}

impl FromStr for Pattern {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// `true` if the string contains glob metacharacters.
pub fn is_wildcard(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

fn has_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
