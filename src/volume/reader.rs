//! Concatenated view over several segments.

use std::io;

use super::{ReadAt, Segment};

/// A byte source that reads seamlessly across several segments.
///
/// Logical offset `0` is the first byte of the first segment; each following
/// segment starts where the previous one ends. A read that crosses a segment
/// boundary is split and continues in the next segment, so callers never see
/// the seams.
///
/// # Example
///
/// ```rust,ignore
/// use zipvfs::volume::{ReadAt, Segment, SpannedReader};
///
/// let reader = SpannedReader::new(vec![
///     Segment::open("archive.z01")?,
///     Segment::open("archive.zip")?,
/// ]);
///
/// // Read 16 bytes straddling the first boundary
/// let mut buf = [0u8; 16];
/// reader.read_exact_at(reader.disk_start(1).unwrap() - 8, &mut buf)?;
/// ```
#[derive(Debug)]
pub struct SpannedReader {
    segments: Vec<Segment>,
    /// Logical start offset of each segment.
    starts: Vec<u64>,
    total_size: u64,
}

impl SpannedReader {
    /// Builds a reader over already-opened segments, in order.
    pub fn new(segments: Vec<Segment>) -> Self {
        let mut starts = Vec::with_capacity(segments.len());
        let mut total_size = 0u64;
        for segment in &segments {
            starts.push(total_size);
            total_size += segment.len();
        }
        Self {
            segments,
            starts,
            total_size,
        }
    }

    /// Returns the segments in logical order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Maps a logical position to a segment index and the offset inside it.
    ///
    /// Empty segments share their start with the next one and are never
    /// selected. Returns `None` at or past the end of the last segment.
    fn locate(&self, pos: u64) -> Option<(usize, u64)> {
        if pos >= self.total_size {
            return None;
        }
        let index = self.starts.partition_point(|&start| start <= pos) - 1;
        Some((index, pos - self.starts[index]))
    }

    /// Closes every segment, last first.
    pub fn close(&self) {
        for segment in self.segments.iter().rev() {
            segment.close();
        }
    }
}

impl ReadAt for SpannedReader {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        let mut pos = offset;

        while filled < buf.len() {
            let Some((index, local)) = self.locate(pos) else {
                break;
            };
            let segment = &self.segments[index];
            let available = (segment.len() - local).min((buf.len() - filled) as u64) as usize;
            let n = segment.read_at(local, &mut buf[filled..filled + available])?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("segment '{}' is shorter than recorded", segment.path().display()),
                ));
            }
            filled += n;
            pos += n as u64;
        }

        Ok(filled)
    }

    fn size(&self) -> u64 {
        self.total_size
    }

    fn disk_start(&self, disk: u32) -> Option<u64> {
        self.starts.get(disk as usize).copied()
    }

    fn disk_count(&self) -> u32 {
        self.segments.len() as u32
    }
}
