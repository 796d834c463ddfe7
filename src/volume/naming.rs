//! Discovery and ordering of split-archive segments.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

static SEGMENT_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:z(\d+)|zip)$").expect("segment extension pattern is valid")
});

/// Position of a segment within a split archive.
///
/// Numbered parts sort by number; the terminal `.zip` segment sorts after
/// every numbered part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SegmentKind {
    /// A numbered part (`.z01` is `Part(1)`).
    Part(u32),
    /// The terminal `.zip` segment.
    Terminal,
}

/// A file name parsed according to the split-archive naming convention.
///
/// # Example
///
/// ```rust
/// use zipvfs::volume::{SegmentKind, SegmentName};
///
/// let name = SegmentName::parse("Backup.Z02").unwrap();
/// assert_eq!(name.base(), "Backup");
/// assert_eq!(name.kind(), SegmentKind::Part(2));
///
/// assert!(SegmentName::parse("backup.tar").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentName {
    base: String,
    kind: SegmentKind,
}

impl SegmentName {
    /// Parses a bare file name such as `archive.z01` or `archive.zip`.
    ///
    /// Returns `None` when the extension does not follow the convention, the
    /// part number does not fit in a `u32`, or the base name is empty.
    pub fn parse(file_name: &str) -> Option<Self> {
        let (base, ext) = file_name.rsplit_once('.')?;
        if base.is_empty() {
            return None;
        }
        let caps = SEGMENT_EXTENSION.captures(ext)?;
        let kind = match caps.get(1) {
            Some(digits) => SegmentKind::Part(digits.as_str().parse().ok()?),
            None => SegmentKind::Terminal,
        };
        Some(Self {
            base: base.to_string(),
            kind,
        })
    }

    /// Returns the base name (file name without the segment extension).
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the segment's position in the archive.
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Returns true if `other` belongs to the same archive.
    ///
    /// Base names are compared case-insensitively.
    pub fn same_archive(&self, other: &SegmentName) -> bool {
        self.base.to_lowercase() == other.base.to_lowercase()
    }
}

impl PartialOrd for SegmentName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SegmentName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.base.cmp(&other.base))
    }
}

/// Finds and orders every segment of the archive that `path` belongs to.
///
/// `path` may name any segment (`a.z01`, `a.z02`, `a.zip`, ...). Sibling
/// files in the same directory are matched by base name, ignoring case, and
/// by extension. The result is ordered `a.z01, a.z02, ..., a.zip`; a plain
/// single-file archive yields one path.
///
/// # Errors
///
/// - [`Error::InvalidConfig`] for a blank path, a segment set without a
///   terminal `.zip`, or two segments with the same number
/// - [`Error::NoSegments`] when nothing matches (including a path whose own
///   extension is not a segment extension)
/// - [`Error::Io`] when the directory cannot be listed
pub fn resolve_segments(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() || path.to_string_lossy().trim().is_empty() {
        return Err(Error::InvalidConfig("archive path is blank".into()));
    }

    let no_segments = || Error::NoSegments {
        path: path.display().to_string(),
    };

    let target = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(SegmentName::parse)
        .ok_or_else(no_segments)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut found: Vec<(SegmentName, PathBuf)> = Vec::new();
    for dir_entry in std::fs::read_dir(dir)? {
        let dir_entry = dir_entry?;
        if dir_entry.file_type()?.is_dir() {
            continue;
        }
        let file_name = dir_entry.file_name();
        let Some(name) = file_name.to_str().and_then(SegmentName::parse) else {
            continue;
        };
        if name.same_archive(&target) {
            found.push((name, dir_entry.path()));
        }
    }

    if found.is_empty() {
        return Err(no_segments());
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));

    for pair in found.windows(2) {
        if pair[0].0.kind() == pair[1].0.kind() {
            return Err(Error::InvalidConfig(format!(
                "segments '{}' and '{}' have the same position",
                pair[0].1.display(),
                pair[1].1.display()
            )));
        }
    }

    if found.last().map(|(name, _)| name.kind()) != Some(SegmentKind::Terminal) {
        return Err(Error::InvalidConfig(format!(
            "no terminal .zip segment found for '{}'",
            path.display()
        )));
    }

    let paths: Vec<PathBuf> = found.into_iter().map(|(_, p)| p).collect();
    log::debug!(
        "Resolved {} segment(s) for '{}': {:?}",
        paths.len(),
        path.display(),
        paths
    );
    Ok(paths)
}
