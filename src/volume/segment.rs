//! A single physical segment file.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::ReadAt;
use crate::{Error, Result};

/// One opened segment file, readable at arbitrary offsets.
///
/// The handle can be released with [`close`](Self::close) while other threads
/// still hold references; their subsequent reads fail with a stale-handle
/// error instead of touching a closed descriptor.
#[derive(Debug)]
pub struct Segment {
    path: PathBuf,
    len: u64,
    file: RwLock<Option<File>>,
}

impl Segment {
    /// Opens a segment file and records its length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SegmentUnavailable`] if the file cannot be opened or
    /// its metadata cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let unavailable = |source| Error::SegmentUnavailable {
            path: path.display().to_string(),
            source,
        };
        let file = File::open(path).map_err(unavailable)?;
        let len = file.metadata().map_err(unavailable)?.len();
        log::trace!("Opened segment '{}' ({} bytes)", path.display(), len);
        Ok(Self {
            path: path.to_path_buf(),
            len,
            file: RwLock::new(Some(file)),
        })
    }

    /// Returns the path this segment was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the segment length in bytes, as measured at open.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if the segment holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.read_guard().is_none()
    }

    /// Releases the file handle. Calling this more than once is a no-op.
    pub fn close(&self) {
        if self.write_guard().take().is_some() {
            log::trace!("Closed segment '{}'", self.path.display());
        }
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, Option<File>> {
        self.file.read().unwrap_or_else(|poisoned| {
            log::warn!(
                "Segment lock for '{}' was poisoned, recovering",
                self.path.display()
            );
            poisoned.into_inner()
        })
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Option<File>> {
        self.file.write().unwrap_or_else(|poisoned| {
            log::warn!(
                "Segment lock for '{}' was poisoned, recovering",
                self.path.display()
            );
            poisoned.into_inner()
        })
    }
}

fn stale_handle() -> io::Error {
    io::Error::other(Error::Closed)
}

impl ReadAt for Segment {
    #[cfg(unix)]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        use std::os::unix::fs::FileExt;

        let guard = self.read_guard();
        let file = guard.as_ref().ok_or_else(stale_handle)?;
        file.read_at(buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        use std::os::windows::fs::FileExt;

        let guard = self.read_guard();
        let file = guard.as_ref().ok_or_else(stale_handle)?;
        file.seek_read(buf, offset)
    }

    #[cfg(not(any(unix, windows)))]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        use std::io::{Read, Seek, SeekFrom};

        let mut guard = self.write_guard();
        let file = guard.as_mut().ok_or_else(stale_handle)?;
        file.seek(SeekFrom::Start(offset))?;
        file.read(buf)
    }

    fn size(&self) -> u64 {
        self.len
    }
}
