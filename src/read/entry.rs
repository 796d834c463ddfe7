//! Entry and attribute types exposed by the archive filesystem.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::VirtualPath;
use crate::codec::CompressionMethod;
use crate::format::RawEntry;
use crate::timestamp::Timestamp;

/// An entry known to the archive index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexedEntry {
    /// A directory implied by the entries below it but not stored in the
    /// archive. It has no data.
    Synthetic {
        /// Raw name of the directory, with a trailing `/`.
        name: String,
    },
    /// An entry stored in the central directory.
    Stored(RawEntry),
}

impl IndexedEntry {
    /// Returns the raw entry name.
    pub fn name(&self) -> &str {
        match self {
            IndexedEntry::Synthetic { name } => name,
            IndexedEntry::Stored(entry) => &entry.name,
        }
    }

    /// Returns true for directories, synthetic or stored.
    pub fn is_dir(&self) -> bool {
        match self {
            IndexedEntry::Synthetic { .. } => true,
            IndexedEntry::Stored(entry) => entry.is_dir,
        }
    }

    /// Returns true for synthetic directories.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, IndexedEntry::Synthetic { .. })
    }

    /// Returns the stored entry, if this is not synthetic.
    pub fn raw(&self) -> Option<&RawEntry> {
        match self {
            IndexedEntry::Synthetic { .. } => None,
            IndexedEntry::Stored(entry) => Some(entry),
        }
    }

    /// Returns the uncompressed size (zero for synthetic entries).
    pub fn size(&self) -> u64 {
        self.raw().map_or(0, |e| e.size)
    }
}

/// The result of resolving a virtual path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    /// The archive root. It has no backing entry.
    Root,
    /// An indexed entry.
    Entry(&'a IndexedEntry),
}

impl<'a> Node<'a> {
    /// Returns true for the root and for directory entries.
    pub fn is_dir(&self) -> bool {
        match self {
            Node::Root => true,
            Node::Entry(entry) => entry.is_dir(),
        }
    }

    /// Returns the backing entry, or `None` for the root.
    pub fn entry(&self) -> Option<&'a IndexedEntry> {
        match self {
            Node::Root => None,
            Node::Entry(entry) => Some(entry),
        }
    }
}

/// File attributes of a virtual path.
///
/// Times the archive did not record fall back in the order modified,
/// accessed, created, and finally the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct FileAttributes {
    /// True for regular files.
    pub is_regular_file: bool,
    /// True for directories, including the root.
    pub is_directory: bool,
    /// Uncompressed size. For the root, the total length of the archive.
    pub size: u64,
    /// Compressed size. For the root, the total length of the archive.
    pub compressed_size: u64,
    /// Compression method, or `None` for the root and synthetic directories.
    pub method: Option<CompressionMethod>,
    /// Last modification time.
    pub modified: SystemTime,
    /// Last access time.
    pub accessed: SystemTime,
    /// Creation time.
    pub created: SystemTime,
    /// Unix permission bits, when the entry was written on Unix.
    pub unix_mode: Option<u32>,
}

impl FileAttributes {
    /// Attributes of the archive root.
    pub(crate) fn root(total_len: u64) -> Self {
        Self {
            is_regular_file: false,
            is_directory: true,
            size: total_len,
            compressed_size: total_len,
            method: None,
            modified: UNIX_EPOCH,
            accessed: UNIX_EPOCH,
            created: UNIX_EPOCH,
            unix_mode: None,
        }
    }

    /// Attributes of an indexed entry.
    pub(crate) fn of(entry: &IndexedEntry) -> Self {
        let Some(raw) = entry.raw() else {
            return Self::root(0);
        };

        let fallback = raw
            .modified
            .or(raw.accessed)
            .or(raw.created)
            .map_or(UNIX_EPOCH, |t| t.as_system_time());
        let time = |t: Option<Timestamp>| t.map_or(fallback, |t| t.as_system_time());

        Self {
            is_regular_file: !raw.is_dir,
            is_directory: raw.is_dir,
            size: raw.size,
            compressed_size: raw.compressed_size,
            method: Some(raw.method),
            modified: time(raw.modified),
            accessed: time(raw.accessed),
            created: time(raw.created),
            unix_mode: raw.unix_mode(),
        }
    }
}

/// A child returned by directory listing.
#[derive(Debug, Clone, Copy)]
pub struct DirEntry<'a> {
    path: &'a VirtualPath,
    node: Node<'a>,
}

impl<'a> DirEntry<'a> {
    pub(crate) fn new(path: &'a VirtualPath, node: Node<'a>) -> Self {
        Self { path, node }
    }

    /// Returns the full virtual path of the child.
    pub fn path(&self) -> &'a VirtualPath {
        self.path
    }

    /// Returns the last segment of the child's path.
    pub fn file_name(&self) -> &'a str {
        self.path.file_name().unwrap_or_default()
    }

    /// Returns the resolved node.
    pub fn node(&self) -> Node<'a> {
        self.node
    }

    /// Returns true if the child is a directory.
    pub fn is_dir(&self) -> bool {
        self.node.is_dir()
    }

    /// Returns the uncompressed size of the child.
    pub fn size(&self) -> u64 {
        self.node.entry().map_or(0, IndexedEntry::size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str) -> RawEntry {
        RawEntry {
            name: name.to_string(),
            raw_name: name.as_bytes().to_vec(),
            is_dir: name.ends_with('/'),
            size: 10,
            compressed_size: 7,
            crc32: 0,
            method: CompressionMethod::Deflate,
            flags: 0,
            header_offset: 0,
            disk_start: 0,
            version_made_by: 20,
            external_attributes: 0,
            modified: None,
            accessed: None,
            created: None,
        }
    }

    #[test]
    fn test_root_attributes() {
        let attrs = FileAttributes::root(350);
        assert!(attrs.is_directory);
        assert!(!attrs.is_regular_file);
        assert_eq!(attrs.size, 350);
        assert_eq!(attrs.modified, UNIX_EPOCH);
    }

    #[test]
    fn test_time_fallback_order() {
        let mut entry = raw("a.txt");
        let accessed = Timestamp::from_unix_secs(1_000).unwrap();
        let created = Timestamp::from_unix_secs(2_000).unwrap();
        entry.accessed = Some(accessed);
        entry.created = Some(created);

        let attrs = FileAttributes::of(&IndexedEntry::Stored(entry));
        assert_eq!(attrs.modified, accessed.as_system_time());
        assert_eq!(attrs.accessed, accessed.as_system_time());
        assert_eq!(attrs.created, created.as_system_time());
        assert!(attrs.is_regular_file);
        assert_eq!(attrs.compressed_size, 7);
    }

    #[test]
    fn test_no_times_is_epoch() {
        let attrs = FileAttributes::of(&IndexedEntry::Stored(raw("a.txt")));
        assert_eq!(attrs.modified, UNIX_EPOCH);
        assert_eq!(attrs.accessed, UNIX_EPOCH);
        assert_eq!(attrs.created, UNIX_EPOCH);
    }

    #[test]
    fn test_synthetic_entry() {
        let entry = IndexedEntry::Synthetic {
            name: "proj/".into(),
        };
        assert!(entry.is_dir());
        assert!(entry.is_synthetic());
        assert_eq!(entry.size(), 0);

        let attrs = FileAttributes::of(&entry);
        assert!(attrs.is_directory);
        assert_eq!(attrs.size, 0);
        assert_eq!(attrs.method, None);
    }
}
