//! Unified byte source over single-file and split archives.

use std::io;
use std::path::{Path, PathBuf};

use super::{ReadAt, Segment, SpannedReader};
use crate::{Error, Result};

/// The assembled byte source of an archive.
///
/// A single segment is exposed directly; several segments are concatenated
/// through a [`SpannedReader`].
#[derive(Debug)]
pub enum ArchiveSource {
    /// Single-file archive.
    Single(Segment),
    /// Archive split across several segment files.
    Spanned(SpannedReader),
}

impl ArchiveSource {
    /// Opens the ordered segment paths.
    ///
    /// If any segment fails to open, the segments opened before it are
    /// closed (last first) and the error is returned.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] for an empty path list
    /// - [`Error::SegmentUnavailable`] if a segment cannot be opened
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut opened: Vec<Segment> = Vec::with_capacity(paths.len());
        for path in paths {
            match Segment::open(path) {
                Ok(segment) => opened.push(segment),
                Err(e) => {
                    for segment in opened.iter().rev() {
                        segment.close();
                    }
                    return Err(e);
                }
            }
        }

        if opened.len() > 1 {
            return Ok(ArchiveSource::Spanned(SpannedReader::new(opened)));
        }
        opened
            .pop()
            .map(ArchiveSource::Single)
            .ok_or_else(|| Error::InvalidConfig("no segment paths given".into()))
    }

    /// Returns true if the archive spans more than one segment.
    pub fn is_spanned(&self) -> bool {
        matches!(self, ArchiveSource::Spanned(_))
    }

    /// Returns the segments in logical order.
    pub fn segments(&self) -> &[Segment] {
        match self {
            ArchiveSource::Single(segment) => std::slice::from_ref(segment),
            ArchiveSource::Spanned(reader) => reader.segments(),
        }
    }

    /// Returns the segment paths in logical order.
    pub fn segment_paths(&self) -> Vec<PathBuf> {
        self.segments()
            .iter()
            .map(|s| s.path().to_path_buf())
            .collect()
    }

    /// Returns the sum of all segment lengths.
    pub fn total_len(&self) -> u64 {
        self.size()
    }

    /// Closes every segment, last first. Subsequent reads fail with a
    /// stale-handle error. Calling this more than once is a no-op.
    pub fn close(&self) {
        match self {
            ArchiveSource::Single(segment) => segment.close(),
            ArchiveSource::Spanned(reader) => reader.close(),
        }
    }
}

impl ReadAt for ArchiveSource {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ArchiveSource::Single(s) => s.read_at(offset, buf),
            ArchiveSource::Spanned(r) => r.read_at(offset, buf),
        }
    }

    fn size(&self) -> u64 {
        match self {
            ArchiveSource::Single(s) => s.size(),
            ArchiveSource::Spanned(r) => r.size(),
        }
    }

    fn disk_start(&self, disk: u32) -> Option<u64> {
        match self {
            ArchiveSource::Single(s) => s.disk_start(disk),
            ArchiveSource::Spanned(r) => r.disk_start(disk),
        }
    }

    fn disk_count(&self) -> u32 {
        match self {
            ArchiveSource::Single(s) => s.disk_count(),
            ArchiveSource::Spanned(r) => r.disk_count(),
        }
    }
}
