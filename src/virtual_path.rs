//! Canonical root-relative paths inside an archive filesystem.

use std::fmt;

/// A canonical path inside the archive filesystem.
///
/// `VirtualPath` stores its segments joined by `/`, without a leading or
/// trailing separator. Construction canonicalizes its input instead of
/// rejecting it:
/// - empty segments are dropped (`a//b` is `a/b`, `/a/` is `a`)
/// - `.` segments are dropped
/// - `..` removes the previous segment and never climbs above the root
///
/// The root is the empty path. Two paths are equal iff their canonical
/// segment sequences are equal.
///
/// # Examples
///
/// ```
/// use zipvfs::VirtualPath;
///
/// let path = VirtualPath::new("/docs//./guide/../readme.txt");
/// assert_eq!(path.as_str(), "docs/readme.txt");
/// assert_eq!(path, VirtualPath::new("docs/readme.txt"));
/// assert!(VirtualPath::new("/").is_root());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualPath(String);

impl VirtualPath {
    /// Creates a canonical path from a `/`-delimited string.
    pub fn new(s: &str) -> Self {
        Self::from_segments(s.split('/'))
    }

    /// Returns the root path.
    #[inline]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Builds a canonical path from individual segments.
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut kept: Vec<&str> = Vec::new();
        for segment in segments {
            match segment {
                "" | "." => {}
                ".." => {
                    kept.pop();
                }
                other => kept.push(other),
            }
        }
        Self(kept.join("/"))
    }

    /// Returns the path as a string slice, without a leading `/`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the root path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of segments (0 for the root).
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Returns an iterator over the path segments.
    ///
    /// The root yields no segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Returns the parent directory, or `None` for the root.
    ///
    /// A single-segment path has the root as its parent.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rfind('/') {
            Some(idx) => Self(self.0[..idx].to_string()),
            None => Self::root(),
        })
    }

    /// Returns the last segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.0.rsplit('/').next()
        }
    }

    /// Appends a (possibly multi-segment) relative path.
    pub fn join(&self, other: &str) -> Self {
        Self::from_segments(self.segments().chain(other.split('/')))
    }

    /// Returns true if `prefix` is a segment-wise prefix of this path.
    ///
    /// Every path starts with the root.
    pub fn starts_with(&self, prefix: &VirtualPath) -> bool {
        if prefix.is_root() {
            return true;
        }
        self.0 == prefix.0
            || (self.0.starts_with(&prefix.0) && self.0[prefix.0.len()..].starts_with('/'))
    }

    /// Removes `prefix` from the front of this path.
    ///
    /// Returns `None` if `prefix` is not a segment-wise prefix.
    pub fn strip_prefix(&self, prefix: &VirtualPath) -> Option<Self> {
        if !self.starts_with(prefix) {
            return None;
        }
        if prefix.is_root() {
            return Some(self.clone());
        }
        let rest = self.0[prefix.0.len()..].trim_start_matches('/');
        Some(Self(rest.to_string()))
    }
}

impl AsRef<str> for VirtualPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl From<&str> for VirtualPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<&VirtualPath> for VirtualPath {
    fn from(path: &VirtualPath) -> Self {
        path.clone()
    }
}

impl From<String> for VirtualPath {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_simple_file() {
        let path = VirtualPath::new("file.txt");
        assert_eq!(path.as_str(), "file.txt");
        assert_eq!(path.depth(), 1);
    }

    #[test]
    fn test_leading_and_trailing_slashes() {
        assert_eq!(VirtualPath::new("/dir/file.txt").as_str(), "dir/file.txt");
        assert_eq!(VirtualPath::new("dir/").as_str(), "dir");
    }

    #[test]
    fn test_empty_segments_collapse() {
        assert_eq!(VirtualPath::new("x//y"), VirtualPath::new("x/y"));
    }

    #[test]
    fn test_dot_segments() {
        assert_eq!(VirtualPath::new("./a/./b").as_str(), "a/b");
        assert_eq!(VirtualPath::new("a/b/../c").as_str(), "a/c");
    }

    #[test]
    fn test_dotdot_never_climbs_above_root() {
        assert_eq!(VirtualPath::new("../../a").as_str(), "a");
        assert!(VirtualPath::new("a/..").is_root());
    }

    #[test]
    fn test_root() {
        for s in ["", "/", "//", ".", "./"] {
            let path = VirtualPath::new(s);
            assert!(path.is_root(), "{s:?} should be root");
            assert_eq!(path.depth(), 0);
            assert_eq!(path.segments().count(), 0);
        }
        assert_eq!(VirtualPath::root().to_string(), "/");
    }

    #[test]
    fn test_parent() {
        let path = VirtualPath::new("a/b/c");
        assert_eq!(path.parent(), Some(VirtualPath::new("a/b")));
        assert_eq!(VirtualPath::new("a").parent(), Some(VirtualPath::root()));
        assert_eq!(VirtualPath::root().parent(), None);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(VirtualPath::new("a/b/c.txt").file_name(), Some("c.txt"));
        assert_eq!(VirtualPath::root().file_name(), None);
    }

    #[test]
    fn test_join() {
        let base = VirtualPath::new("a");
        assert_eq!(base.join("b/c").as_str(), "a/b/c");
        assert_eq!(VirtualPath::root().join("x").as_str(), "x");
        assert_eq!(base.join("../y").as_str(), "y");
    }

    #[test]
    fn test_starts_with_component_boundary() {
        let path = VirtualPath::new("proj/a/file.txt");
        assert!(path.starts_with(&VirtualPath::new("proj")));
        assert!(path.starts_with(&VirtualPath::new("proj/a")));
        assert!(path.starts_with(&VirtualPath::root()));
        assert!(!path.starts_with(&VirtualPath::new("pro")));
        assert!(!path.starts_with(&VirtualPath::new("proj/a/file.txt/more")));
    }

    #[test]
    fn test_strip_prefix() {
        let path = VirtualPath::new("proj/a/file.txt");
        assert_eq!(
            path.strip_prefix(&VirtualPath::new("proj")),
            Some(VirtualPath::new("a/file.txt"))
        );
        assert_eq!(
            path.strip_prefix(&VirtualPath::new("proj/a/file.txt")),
            Some(VirtualPath::root())
        );
        assert_eq!(path.strip_prefix(&VirtualPath::new("other")), None);
    }

    #[test]
    fn test_display_is_rooted() {
        assert_eq!(VirtualPath::new("a/b").to_string(), "/a/b");
    }

    #[test]
    fn test_hash_consistency() {
        let mut set = HashSet::new();
        set.insert(VirtualPath::new("a/b"));
        assert!(set.contains(&VirtualPath::new("/a//b/")));
    }

    #[test]
    fn test_unicode() {
        let path = VirtualPath::new("文件夹/файл.txt");
        assert_eq!(path.file_name(), Some("файл.txt"));
    }
}
