//! Split-archive segment support.
//!
//! A ZIP archive may be split across several physical files that share a
//! base name:
//!
//! - `archive.z01` - first segment
//! - `archive.z02` - second segment
//! - `archive.zip` - terminal segment, holding the central directory
//!
//! This module discovers those segments ([`resolve_segments`]), opens each
//! one as an independent positional byte source ([`Segment`]), and presents
//! the ordered set as one logical byte range ([`ArchiveSource`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use zipvfs::volume::{ArchiveSource, ReadAt, resolve_segments};
//!
//! let paths = resolve_segments("backup.z01")?;
//! let source = ArchiveSource::open(&paths)?;
//! println!("{} segments, {} bytes", source.segments().len(), source.size());
//!
//! let mut magic = [0u8; 4];
//! source.read_exact_at(0, &mut magic)?;
//! source.close();
//! ```
//!
//! All reads go through [`ReadAt`], which takes `&self` and an explicit
//! offset. There is no shared cursor, so any number of entry streams can
//! read the same source concurrently.

mod naming;
mod reader;
mod segment;
mod unified;

use std::io;
use std::sync::Arc;

pub use naming::{SegmentKind, SegmentName, resolve_segments};
pub use reader::SpannedReader;
pub use segment::Segment;
pub use unified::ArchiveSource;

/// A byte source that supports reads at arbitrary offsets without a cursor.
///
/// Implementations that span several physical files also report where each
/// file ("disk" in ZIP terminology) starts in the logical range, so that
/// disk-relative offsets from the central directory can be translated.
pub trait ReadAt: Send + Sync {
    /// Reads up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes read; `0` means `offset` is at or past
    /// the end of the source.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Returns the total length of the source in bytes.
    fn size(&self) -> u64;

    /// Returns the logical offset at which `disk` starts.
    fn disk_start(&self, disk: u32) -> Option<u64> {
        (disk == 0).then_some(0)
    }

    /// Returns the number of physical parts behind this source.
    fn disk_count(&self) -> u32 {
        1
    }

    /// Reads exactly `buf.len()` bytes starting at `offset`.
    fn read_exact_at(&self, mut offset: u64, mut buf: &mut [u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.read_at(offset, buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "failed to fill whole buffer",
                    ));
                }
                Ok(n) => {
                    offset += n as u64;
                    buf = &mut buf[n..];
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl ReadAt for [u8] {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.len() as u64;
        if offset >= len {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl ReadAt for Vec<u8> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.as_slice().read_at(offset, buf)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl<T: ReadAt + ?Sized> ReadAt for Arc<T> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn disk_start(&self, disk: u32) -> Option<u64> {
        (**self).disk_start(disk)
    }

    fn disk_count(&self) -> u32 {
        (**self).disk_count()
    }
}

impl<T: ReadAt + ?Sized> ReadAt for &T {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn disk_start(&self, disk: u32) -> Option<u64> {
        (**self).disk_start(disk)
    }

    fn disk_count(&self) -> u32 {
        (**self).disk_count()
    }
}
