//! Filesystem-style API over a ZIP archive.
//!
//! [`ZipFileSystem`] opens a single or split ZIP archive and answers
//! filesystem queries against it: existence, attributes, directory listing
//! and content streaming. The view is read-only.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::io::Read;
//! use zipvfs::ZipFileSystem;
//!
//! let fs = ZipFileSystem::open("backup.z01")?;
//!
//! for child in fs.children("/")? {
//!     println!("{}", child);
//! }
//!
//! if fs.exists("docs/readme.txt")? {
//!     let mut text = String::new();
//!     fs.open_read("docs/readme.txt")?.read_to_string(&mut text)?;
//! }
//! fs.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Path Handling
//!
//! Paths use forward slashes (`/`) as separators, regardless of the platform.
//! Absolute (`/file.txt`) and relative (`file.txt`) forms are equivalent, and
//! `.`/`..` segments are resolved without climbing above the root.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::format::ZipReader;
use crate::read::{
    ArchiveIndex, DirEntry, EntryReader, FileAttributes, IndexedEntry, Node, OpenOptions,
};
use crate::volume::{ArchiveSource, Segment, resolve_segments};
use crate::{Error, Result, VirtualPath};

/// A filesystem operation that would modify the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Writing file contents.
    Write,
    /// Creating a file.
    CreateFile,
    /// Creating a directory.
    CreateDir,
    /// Moving or renaming an entry.
    Move,
    /// Copying an entry.
    Copy,
    /// Deleting an entry.
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Write => "write",
            Operation::CreateFile => "create file",
            Operation::CreateDir => "create directory",
            Operation::Move => "move",
            Operation::Copy => "copy",
            Operation::Delete => "delete",
        })
    }
}

/// A read-only virtual filesystem over a ZIP archive.
///
/// The archive may be split into `.z01`, `.z02`, ..., `.zip` segments; any
/// segment path opens the whole set. The index is built once at open and
/// never changes, so queries take `&self` and the filesystem can be shared
/// between threads. Each [`open_read`](Self::open_read) returns an
/// independent stream.
///
/// Once [`close`](Self::close) has been called every query fails with
/// [`Error::Closed`] and streams still being read fail with a stale-handle
/// I/O error. Dropping the filesystem closes it.
pub struct ZipFileSystem {
    reader: ZipReader<Arc<ArchiveSource>>,
    index: ArchiveIndex,
    verify_crc: bool,
    origin: PathBuf,
    closed: AtomicBool,
}

impl fmt::Debug for ZipFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipFileSystem")
            .field("origin", &self.origin)
            .field("entries", &self.index.len())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl ZipFileSystem {
    /// Opens the archive containing the segment at `path` with default
    /// options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, &OpenOptions::default())
    }

    /// Opens the archive containing the segment at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] for a blank path or an unorderable segment set
    /// - [`Error::NoSegments`] if no segment matches the path's name
    /// - [`Error::SegmentUnavailable`] if a segment cannot be opened
    /// - format errors if the central directory cannot be read
    /// - [`Error::DuplicateEntryName`] or [`Error::PathCollision`] if the
    ///   archive's names are ambiguous
    ///
    /// On error every segment opened so far has been closed.
    pub fn open_with_options(path: impl AsRef<Path>, options: &OpenOptions) -> Result<Self> {
        let origin = path.as_ref().to_path_buf();
        let segments = resolve_segments(&origin)?;
        let source = Arc::new(ArchiveSource::open(&segments)?);

        let reader = ZipReader::new(Arc::clone(&source))
            .with_encoding(options.name_encoding())
            .with_max_entries(options.entry_limit());
        let index = match reader.entries().and_then(ArchiveIndex::build) {
            Ok(index) => index,
            Err(e) => {
                source.close();
                return Err(e);
            }
        };

        log::debug!(
            "Opened {} ({} segment(s), {} bytes, {} entries)",
            origin.display(),
            source.segments().len(),
            source.total_len(),
            index.len()
        );

        Ok(Self {
            reader,
            index,
            verify_crc: options.verifies_crc(),
            origin,
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    fn source(&self) -> &ArchiveSource {
        self.reader.source()
    }

    /// Resolves `path` to the root or to an indexed entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no entry has this path.
    pub fn resolve(&self, path: impl Into<VirtualPath>) -> Result<Node<'_>> {
        self.ensure_open()?;
        let path = path.into();
        if path.is_root() {
            return Ok(Node::Root);
        }
        self.index
            .get(&path)
            .map(Node::Entry)
            .ok_or_else(|| Error::NotFound {
                path: path.to_string(),
            })
    }

    /// Returns true if `path` is the root or names an entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] after [`close`](Self::close).
    pub fn exists(&self, path: impl Into<VirtualPath>) -> Result<bool> {
        match self.resolve(path) {
            Ok(_) => Ok(true),
            Err(Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Returns the attributes of `path`.
    ///
    /// The root is a directory whose size is the total length of all
    /// segments and whose times are the Unix epoch.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] for unknown paths
    /// - [`Error::AccessDenied`] if a file's data cannot be read
    pub fn attributes(&self, path: impl Into<VirtualPath>) -> Result<FileAttributes> {
        let path = path.into();
        match self.resolve(&path)? {
            Node::Root => Ok(FileAttributes::root(self.total_len())),
            Node::Entry(entry) => {
                self.check_readable(&path, entry)?;
                Ok(FileAttributes::of(entry))
            }
        }
    }

    /// Validates that a stored file's data can be decoded.
    fn check_readable(&self, path: &VirtualPath, entry: &IndexedEntry) -> Result<()> {
        match entry.raw() {
            Some(raw) if !raw.is_dir => self
                .reader
                .data_offset(raw)
                .map(drop)
                .map_err(|e| access_error(path, e)),
            _ => Ok(()),
        }
    }

    /// Returns the direct children of `path`, in archive order.
    ///
    /// Files and unknown paths have no children; use
    /// [`attributes`](Self::attributes) to tell them from empty directories.
    pub fn children(&self, path: impl Into<VirtualPath>) -> Result<&[VirtualPath]> {
        self.ensure_open()?;
        Ok(self.index.children(&path.into()))
    }

    /// Lists the children of `path` together with their nodes.
    pub fn read_dir(
        &self,
        path: impl Into<VirtualPath>,
    ) -> Result<impl Iterator<Item = DirEntry<'_>> + '_> {
        let children = self.children(path)?;
        Ok(children.iter().filter_map(move |child| {
            self.index
                .get(child)
                .map(|entry| DirEntry::new(child, Node::Entry(entry)))
        }))
    }

    /// Returns every descendant of `path`, depth-first, parents before
    /// children.
    pub fn walk(&self, path: impl Into<VirtualPath>) -> Result<Vec<VirtualPath>> {
        self.ensure_open()?;
        let mut out = Vec::new();
        let mut stack: Vec<&VirtualPath> = Vec::new();
        let start = path.into();
        stack.extend(self.index.children(&start).iter().rev());
        while let Some(current) = stack.pop() {
            out.push(current.clone());
            stack.extend(self.index.children(current).iter().rev());
        }
        Ok(out)
    }

    /// Opens a stream over the uncompressed contents of `path`.
    ///
    /// Directories, including synthetic ones, yield an empty stream.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] for unknown paths and for the root
    /// - [`Error::AccessDenied`] if the entry cannot be decoded
    pub fn open_read(&self, path: impl Into<VirtualPath>) -> Result<EntryReader> {
        let path = path.into();
        let entry = match self.resolve(&path)? {
            Node::Root => {
                return Err(Error::NotFound {
                    path: path.to_string(),
                });
            }
            Node::Entry(entry) => entry,
        };

        match entry.raw() {
            Some(raw) if !raw.is_dir => EntryReader::open(&self.reader, raw, self.verify_crc)
                .map_err(|e| access_error(&path, e)),
            _ => Ok(EntryReader::empty(entry.name())),
        }
    }

    /// Reads the whole contents of `path` into memory.
    pub fn read_to_vec(&self, path: impl Into<VirtualPath>) -> Result<Vec<u8>> {
        let mut stream = self.open_read(path)?;
        let mut data = Vec::with_capacity(stream.size().min(64 * 1024 * 1024) as usize);
        stream
            .read_to_end(&mut data)
            .map_err(Error::from_stream)?;
        Ok(data)
    }

    /// Returns the raw archive name of the entry at `path`.
    pub fn raw_name(&self, path: impl Into<VirtualPath>) -> Result<&str> {
        let path = path.into();
        match self.resolve(&path)? {
            Node::Root => Err(Error::NotFound {
                path: path.to_string(),
            }),
            Node::Entry(entry) => Ok(entry.name()),
        }
    }

    /// Returns the virtual path of the entry with the given raw name.
    pub fn path_of(&self, raw_name: &str) -> Result<&VirtualPath> {
        self.ensure_open()?;
        self.index.path_of(raw_name).ok_or_else(|| Error::NotFound {
            path: raw_name.to_string(),
        })
    }

    // Mutations. The archive is read-only; these never do any work.

    /// Always fails with [`Error::Unsupported`].
    pub fn write(&self, _path: impl Into<VirtualPath>, _data: &[u8]) -> Result<()> {
        Err(unsupported(Operation::Write))
    }

    /// Always fails with [`Error::Unsupported`].
    pub fn create_file(&self, _path: impl Into<VirtualPath>) -> Result<()> {
        Err(unsupported(Operation::CreateFile))
    }

    /// Always fails with [`Error::Unsupported`].
    pub fn create_dir(&self, _path: impl Into<VirtualPath>) -> Result<()> {
        Err(unsupported(Operation::CreateDir))
    }

    /// Always fails with [`Error::Unsupported`].
    pub fn move_entry(
        &self,
        _from: impl Into<VirtualPath>,
        _to: impl Into<VirtualPath>,
    ) -> Result<()> {
        Err(unsupported(Operation::Move))
    }

    /// Always fails with [`Error::Unsupported`].
    pub fn copy(&self, _from: impl Into<VirtualPath>, _to: impl Into<VirtualPath>) -> Result<()> {
        Err(unsupported(Operation::Copy))
    }

    /// Always fails with [`Error::Unsupported`].
    pub fn delete(&self, _path: impl Into<VirtualPath>) -> Result<()> {
        Err(unsupported(Operation::Delete))
    }

    // Introspection. These describe the archive as opened and stay
    // available after close.

    /// Returns the path the filesystem was opened with.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Returns the segments, in archive order.
    pub fn segments(&self) -> &[Segment] {
        self.source().segments()
    }

    /// Returns the sum of all segment lengths.
    pub fn total_len(&self) -> u64 {
        self.source().total_len()
    }

    /// Returns the number of indexed entries, synthetic and implied
    /// directories included.
    pub fn entry_count(&self) -> usize {
        self.index.len()
    }

    /// Returns the synthetic directories manufactured for this archive,
    /// outermost first.
    pub fn top_entries(&self) -> &[IndexedEntry] {
        self.index.top_entries()
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Closes every segment. Calling it again does nothing.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        log::debug!("Closing {}", self.origin.display());
        self.source().close();
    }
}

impl Drop for ZipFileSystem {
    fn drop(&mut self) {
        self.close();
    }
}

fn unsupported(operation: Operation) -> Error {
    Error::Unsupported { operation }
}

/// Reports a failed readability check as access denied.
///
/// I/O failures and closed handles are passed through unchanged.
fn access_error(path: &VirtualPath, err: Error) -> Error {
    match err {
        Error::Io(e) => Error::from_stream(e),
        Error::Closed => Error::Closed,
        other => Error::AccessDenied {
            path: path.to_string(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        fn assert_send<T: Send>() {}
        assert_send_sync::<ZipFileSystem>();
        assert_send::<EntryReader>();
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Write.to_string(), "write");
        assert_eq!(Operation::CreateDir.to_string(), "create directory");
    }

    #[test]
    fn test_access_error_mapping() {
        let path = VirtualPath::new("a.txt");
        let err = access_error(&path, Error::UnsupportedMethod { method: 99 });
        assert!(err.is_access_denied());
        assert!(err.to_string().contains("99"));

        let err = access_error(&path, Error::Io(Error::Closed.into_io()));
        assert!(matches!(err, Error::Closed));
    }
}
