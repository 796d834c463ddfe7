//! Central directory reader.
//!
//! ZIP files are read from the end:
//! 1. find the end of central directory (EOCD) record
//! 2. if any EOCD field is saturated, follow the ZIP64 locator to the ZIP64
//!    EOCD record
//! 3. read the whole central directory in one positional read and parse
//!    every file header
//! 4. when an entry is opened, validate its local header to find where the
//!    compressed data starts
//!
//! In a split archive every offset stored in these records is relative to
//! the start of the segment ("disk") it names. [`ZipReader`] translates them
//! into logical offsets of the assembled source using
//! [`ReadAt::disk_start`].

use encoding_rs::Encoding;

use super::extra::{Zip64Needs, parse_extra};
use super::names::decode_name;
use super::structures::{
    CentralHeader, EndOfCentralDirectory, LocalHeader, RawEntry, Zip64EndOfCentralDirectory,
    Zip64Locator,
};
use super::{
    CENTRAL_HEADER_SIZE, EOCD_SIGNATURE, EOCD_SIZE, LOCAL_HEADER_SIZE, MAX_COMMENT_SIZE,
    SATURATED_U16, SATURATED_U32, ZIP64_EOCD_SIZE, ZIP64_LOCATOR_SIGNATURE, ZIP64_LOCATOR_SIZE,
};
use crate::codec::CompressionMethod;
use crate::timestamp::Timestamp;
use crate::volume::ReadAt;
use crate::{Error, Result};

/// Default cap on the number of central directory entries.
pub const DEFAULT_MAX_ENTRIES: usize = 1_000_000;

/// MS-DOS directory attribute bit.
const DOS_DIRECTORY: u32 = 0x10;

/// Location of the central directory, after ZIP64 and disk translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirectoryLocation {
    offset: u64,
    size: u64,
    entries: u64,
}

/// Reads the central directory of a ZIP archive from a positional source.
///
/// # Example
///
/// ```rust,ignore
/// use zipvfs::format::ZipReader;
///
/// let bytes = std::fs::read("archive.zip")?;
/// let reader = ZipReader::new(bytes);
/// for entry in reader.entries()? {
///     println!("{} ({} bytes)", entry.name, entry.size);
/// }
/// ```
#[derive(Debug)]
pub struct ZipReader<R> {
    source: R,
    encoding: Option<&'static Encoding>,
    max_entries: usize,
}

impl<R: ReadAt> ZipReader<R> {
    /// Creates a reader over `source`.
    pub fn new(source: R) -> Self {
        Self {
            source,
            encoding: None,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Sets the encoding used for names stored without the UTF-8 flag.
    pub fn with_encoding(mut self, encoding: Option<&'static Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the maximum number of central directory entries accepted.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Returns the underlying source.
    pub fn source(&self) -> &R {
        &self.source
    }

    /// Finds and parses the end of central directory record.
    ///
    /// Tries the comment-less position first, then scans backwards through
    /// the largest possible comment.
    ///
    /// # Returns
    ///
    /// The record and its logical offset.
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        let size = self.source.size();
        if size < EOCD_SIZE as u64 {
            return Err(Error::InvalidFormat(format!(
                "{size} bytes is too small for a ZIP archive"
            )));
        }

        let offset = size - EOCD_SIZE as u64;
        let mut buf = [0u8; EOCD_SIZE];
        self.source.read_exact_at(offset, &mut buf)?;
        if buf[..4] == EOCD_SIGNATURE.to_le_bytes() && buf[20..22] == [0, 0] {
            return Ok((EndOfCentralDirectory::parse(&buf, offset)?, offset));
        }

        let search_size = ((MAX_COMMENT_SIZE + EOCD_SIZE) as u64).min(size) as usize;
        let search_start = size - search_size as u64;
        let mut buf = vec![0u8; search_size];
        self.source.read_exact_at(search_start, &mut buf)?;

        let signature = EOCD_SIGNATURE.to_le_bytes();
        for i in (0..=search_size - EOCD_SIZE).rev() {
            if buf[i..i + 4] != signature {
                continue;
            }
            let comment_len = usize::from(u16::from_le_bytes([buf[i + 20], buf[i + 21]]));
            if i + EOCD_SIZE + comment_len <= search_size {
                let offset = search_start + i as u64;
                let eocd = EndOfCentralDirectory::parse(&buf[i..i + EOCD_SIZE], offset)?;
                return Ok((eocd, offset));
            }
        }

        Err(Error::InvalidFormat(
            "end of central directory record not found".into(),
        ))
    }

    /// Translates a disk-relative offset into a logical offset.
    ///
    /// Single-part sources use offsets verbatim.
    fn logical_offset(&self, disk: u32, offset: u64) -> Result<u64> {
        if self.source.disk_count() <= 1 {
            return Ok(offset);
        }
        let start = self.source.disk_start(disk).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "offset refers to segment {} of {}",
                disk + 1,
                self.source.disk_count()
            ))
        })?;
        start
            .checked_add(offset)
            .ok_or_else(|| Error::InvalidFormat(format!("offset {offset:#x} overflows")))
    }

    /// Checks the declared segment count against the source.
    fn check_disk_count(&self, last_disk: u32) -> Result<()> {
        let declared = last_disk.saturating_add(1);
        let found = self.source.disk_count();
        if declared > found {
            return Err(Error::IncompleteArchive {
                expected: declared,
                found,
            });
        }
        if declared < found {
            return Err(Error::InvalidFormat(format!(
                "archive declares {declared} segment(s) but {found} were found"
            )));
        }
        Ok(())
    }

    /// Reads the ZIP64 records that precede the EOCD at `eocd_offset`.
    ///
    /// Returns `None` if there is no ZIP64 locator.
    fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Option<Zip64EndOfCentralDirectory>> {
        let Some(locator_offset) = eocd_offset.checked_sub(ZIP64_LOCATOR_SIZE as u64) else {
            return Ok(None);
        };
        let mut buf = [0u8; ZIP64_LOCATOR_SIZE];
        self.source.read_exact_at(locator_offset, &mut buf)?;
        if buf[..4] != ZIP64_LOCATOR_SIGNATURE.to_le_bytes() {
            return Ok(None);
        }
        let locator = Zip64Locator::parse(&buf, locator_offset)?;

        let offset = self.logical_offset(locator.disk_with_eocd64, locator.eocd64_offset)?;
        let mut buf = [0u8; ZIP64_EOCD_SIZE];
        self.source.read_exact_at(offset, &mut buf).map_err(|_| {
            Error::corrupt_header(offset, "ZIP64 end of central directory out of bounds")
        })?;
        Zip64EndOfCentralDirectory::parse(&buf, offset).map(Some)
    }

    fn locate_directory(&self) -> Result<DirectoryLocation> {
        let (eocd, eocd_offset) = self.find_eocd()?;
        log::debug!(
            "EOCD at {:#x}: {} entries, central directory {} bytes",
            eocd_offset,
            eocd.total_entries,
            eocd.cd_size
        );

        let zip64 = if eocd.is_zip64() {
            let record = self.read_zip64_eocd(eocd_offset)?;
            if record.is_none() {
                log::debug!("Saturated EOCD without ZIP64 locator; using 32-bit values");
            }
            record
        } else {
            None
        };

        let (last_disk, cd_disk, raw_offset, size, entries) = match &zip64 {
            Some(z) => {
                log::debug!("Using ZIP64 end of central directory");
                (z.disk_number, z.disk_with_cd, z.cd_offset, z.cd_size, z.total_entries)
            }
            None => (
                u32::from(eocd.disk_number),
                u32::from(eocd.disk_with_cd),
                u64::from(eocd.cd_offset),
                u64::from(eocd.cd_size),
                u64::from(eocd.total_entries),
            ),
        };

        self.check_disk_count(last_disk)?;
        let offset = self.logical_offset(cd_disk, raw_offset)?;

        if entries > self.max_entries as u64 {
            return Err(Error::ResourceLimitExceeded(format!(
                "archive lists {} entries, limit is {}",
                entries, self.max_entries
            )));
        }
        let end = offset.checked_add(size);
        if end.is_none_or(|end| end > self.source.size()) {
            return Err(Error::corrupt_header(
                offset,
                format!("central directory of {size} bytes extends past end of archive"),
            ));
        }
        if entries.saturating_mul(CENTRAL_HEADER_SIZE as u64) > size {
            return Err(Error::corrupt_header(
                offset,
                format!("central directory of {size} bytes cannot hold {entries} entries"),
            ));
        }

        Ok(DirectoryLocation {
            offset,
            size,
            entries,
        })
    }

    /// Parses every central directory entry, in physical order.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFormat`] if no EOCD record is found
    /// - [`Error::IncompleteArchive`] if the archive declares more segments
    ///   than the source holds
    /// - [`Error::CorruptHeader`] for truncated or inconsistent records
    /// - [`Error::ResourceLimitExceeded`] above the configured entry limit
    pub fn entries(&self) -> Result<Vec<RawEntry>> {
        let location = self.locate_directory()?;

        let mut data = vec![0u8; location.size as usize];
        self.source.read_exact_at(location.offset, &mut data)?;

        let mut entries = Vec::with_capacity(location.entries as usize);
        let mut pos = 0usize;
        for _ in 0..location.entries {
            let header_offset = location.offset + pos as u64;
            let (entry, consumed) = self.parse_entry(&data[pos..], header_offset)?;
            log::trace!(
                "Central directory entry '{}' ({:?}, {} bytes)",
                entry.name,
                entry.method,
                entry.size
            );
            entries.push(entry);
            pos += consumed;
        }

        Ok(entries)
    }

    /// Parses one central directory file header and its variable part.
    ///
    /// Returns the entry and the number of bytes it occupied.
    fn parse_entry(&self, data: &[u8], offset: u64) -> Result<(RawEntry, usize)> {
        let header = CentralHeader::parse(data, offset)?;
        let total = CENTRAL_HEADER_SIZE + header.variable_len();
        if data.len() < total {
            return Err(Error::corrupt_header(
                offset,
                "central directory header runs past the directory",
            ));
        }

        let name_end = CENTRAL_HEADER_SIZE + usize::from(header.name_len);
        let extra_end = name_end + usize::from(header.extra_len);
        let raw_name = data[CENTRAL_HEADER_SIZE..name_end].to_vec();

        let needs = Zip64Needs {
            size: header.uncompressed_size == SATURATED_U32,
            compressed_size: header.compressed_size == SATURATED_U32,
            header_offset: header.header_offset == SATURATED_U32,
            disk_start: header.disk_start == SATURATED_U16,
        };
        let extra = parse_extra(&data[name_end..extra_end], needs, offset)?;

        let name = decode_name(
            &raw_name,
            header.flags,
            extra.unicode_path.as_ref(),
            self.encoding,
        );
        let is_dir = name.ends_with('/')
            || (header.version_made_by >> 8 == 0 && header.external_attributes & DOS_DIRECTORY != 0);

        let disk_start = extra
            .disk_start
            .unwrap_or(u32::from(header.disk_start));
        let raw_header_offset = extra
            .header_offset
            .unwrap_or(u64::from(header.header_offset));

        let entry = RawEntry {
            name,
            raw_name,
            is_dir,
            size: extra.size.unwrap_or(u64::from(header.uncompressed_size)),
            compressed_size: extra
                .compressed_size
                .unwrap_or(u64::from(header.compressed_size)),
            crc32: header.crc32,
            method: CompressionMethod::from_u16(header.method),
            flags: header.flags,
            header_offset: self.logical_offset(disk_start, raw_header_offset)?,
            disk_start,
            version_made_by: header.version_made_by,
            external_attributes: header.external_attributes,
            modified: extra
                .modified
                .or_else(|| Timestamp::from_dos(header.dos_date, header.dos_time)),
            accessed: extra.accessed,
            created: extra.created,
        };
        Ok((entry, total))
    }

    /// Validates the local header of `entry` and returns the logical offset
    /// of its compressed data.
    ///
    /// # Errors
    ///
    /// - [`Error::CorruptHeader`] if the local header is missing, names a
    ///   different entry or method, or the data runs past the archive
    /// - [`Error::UnsupportedFeature`] for encrypted entries
    /// - [`Error::UnsupportedMethod`] for methods this build cannot decode
    /// - [`Error::Io`] if the source cannot be read
    pub fn data_offset(&self, entry: &RawEntry) -> Result<u64> {
        let offset = entry.header_offset;
        let archive_size = self.source.size();
        if offset.saturating_add(LOCAL_HEADER_SIZE as u64) > archive_size {
            return Err(Error::corrupt_header(offset, "local header out of bounds"));
        }

        let mut fixed = [0u8; LOCAL_HEADER_SIZE];
        self.source.read_exact_at(offset, &mut fixed)?;
        let local = LocalHeader::parse(&fixed, offset)?;

        let mut name = vec![0u8; usize::from(local.name_len)];
        self.source
            .read_exact_at(offset + LOCAL_HEADER_SIZE as u64, &mut name)?;
        if name != entry.raw_name {
            return Err(Error::corrupt_header(
                offset,
                "local header names a different entry",
            ));
        }

        if local.method != entry.method.as_u16() {
            return Err(Error::corrupt_header(
                offset,
                format!(
                    "local header method {} differs from central directory method {}",
                    local.method,
                    entry.method.as_u16()
                ),
            ));
        }

        if entry.is_encrypted() || local.flags & super::flags::ENCRYPTED != 0 {
            return Err(Error::UnsupportedFeature {
                feature: "encryption",
            });
        }

        if !entry.method.is_supported() {
            return Err(Error::UnsupportedMethod {
                method: entry.method.as_u16(),
            });
        }

        let data_start = offset
            + LOCAL_HEADER_SIZE as u64
            + u64::from(local.name_len)
            + u64::from(local.extra_len);
        if data_start.saturating_add(entry.compressed_size) > archive_size {
            return Err(Error::corrupt_header(
                offset,
                "entry data extends past end of archive",
            ));
        }

        Ok(data_start)
    }
}
