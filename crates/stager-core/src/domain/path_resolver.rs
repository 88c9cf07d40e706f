//! Pure path arithmetic shared by the matcher and the projector.
//!
//! Nothing here touches the filesystem. Relative paths are always rendered
//! with `/` separators and a leading `/`, whatever the host platform uses,
//! so match sets and archive keys compare equal across platforms.

use std::path::{Component, Path, PathBuf};

/// Separator used in every relative path this module produces.
pub const SEPARATOR: char = '/';

/// Suffix of `full` beyond `base`, rooted with a leading `/`.
///
/// `.` components are dropped on both sides before comparing. When `full`
/// does not sit under `base` the normalised `full` is returned instead, still
/// `/`-rooted. `full == base` yields `/`.
pub fn relative_path(base: impl AsRef<Path>, full: impl AsRef<Path>) -> String {
    let base = normal_components(base.as_ref());
    let full = normal_components(full.as_ref());

    let suffix = if full.len() >= base.len() && full[..base.len()] == base[..] {
        &full[base.len()..]
    } else {
        &full[..]
    };

    let mut out = String::new();
    for part in suffix {
        out.push(SEPARATOR);
        out.push_str(part);
    }
    if out.is_empty() {
        out.push(SEPARATOR);
    }
    out
}

/// Join a `/`-separated relative path onto `root`, one component at a time.
///
/// Empty and `.` segments are skipped so `"/a//./b"` lands at `root/a/b`.
pub fn destination(root: impl AsRef<Path>, relative: &str) -> PathBuf {
    let mut out = root.as_ref().to_path_buf();
    for segment in relative.split(SEPARATOR) {
        if segment.is_empty() || segment == "." {
            continue;
        }
        out.push(segment);
    }
    out
}

/// Last component of `path` as an owned string, or `None` for roots and `..`.
pub fn base_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Collapse `.` and `..` components of `path` without touching the disk.
///
/// `..` directly under the root is dropped; leading `..` of a relative path
/// is kept. An empty result is `.`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::CurDir => None,
            Component::RootDir => None,
            Component::Prefix(p) => Some(p.as_os_str().to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_strips_base() {
        let base = Path::new("/work/project");
        let full = base.join("abc").join("xyz").join("fff");
        assert_eq!(relative_path(base, &full), "/abc/xyz/fff");
    }

    #[test]
    fn relative_path_of_base_itself_is_root() {
        assert_eq!(relative_path("/work/project", "/work/project"), "/");
    }

    #[test]
    fn relative_path_ignores_cur_dir_components() {
        assert_eq!(relative_path("/work/./project", "/work/project/./a/b"), "/a/b");
    }

    #[test]
    fn relative_path_does_not_require_existence() {
        assert_eq!(
            relative_path("/definitely/not/here", "/definitely/not/here/x.txt"),
            "/x.txt"
        );
    }

    #[test]
    fn relative_path_outside_base_returns_full() {
        assert_eq!(relative_path("/a/b", "/c/d"), "/c/d");
    }

    #[test]
    fn relative_path_is_component_wise_not_textual() {
        // "/a/bc" must not be treated as living under "/a/b".
        assert_eq!(relative_path("/a/b", "/a/bc/d"), "/a/bc/d");
    }

    #[test]
    fn destination_joins_segments() {
        let dst = destination("/target", "/a/b/c.txt");
        assert_eq!(dst, Path::new("/target").join("a").join("b").join("c.txt"));
    }

    #[test]
    fn destination_skips_empty_and_dot_segments() {
        let dst = destination("/target", "/a//./b");
        assert_eq!(dst, Path::new("/target").join("a").join("b"));
    }

    #[test]
    fn destination_of_root_is_target() {
        assert_eq!(destination("/target", "/"), PathBuf::from("/target"));
    }

    #[test]
    fn base_name_of_file() {
        assert_eq!(base_name(Path::new("/x/y/z.txt")).as_deref(), Some("z.txt"));
        assert_eq!(base_name(Path::new("/")), None);
    }

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(normalize(Path::new("/work/ui1/deep/..")), PathBuf::from("/work/ui1"));
        assert_eq!(normalize(Path::new("/work/./ui1/.")), PathBuf::from("/work/ui1"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("../a/../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }
}
