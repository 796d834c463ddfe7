//! Fixed-layout ZIP records.

use std::io::{self, Cursor};

use byteorder::{LittleEndian, ReadBytesExt};

use super::{
    CENTRAL_HEADER_SIGNATURE, CENTRAL_HEADER_SIZE, EOCD_SIGNATURE, EOCD_SIZE,
    LOCAL_HEADER_SIGNATURE, LOCAL_HEADER_SIZE, SATURATED_U16, SATURATED_U32,
    ZIP64_EOCD_SIGNATURE, ZIP64_EOCD_SIZE, ZIP64_LOCATOR_SIGNATURE, ZIP64_LOCATOR_SIZE, flags,
};
use crate::codec::CompressionMethod;
use crate::timestamp::Timestamp;
use crate::{Error, Result};

fn expect_signature(
    cursor: &mut Cursor<&[u8]>,
    expected: u32,
    offset: u64,
    record: &str,
) -> Result<()> {
    let found = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| Error::corrupt_header(offset, format!("truncated {record}")))?;
    if found != expected {
        return Err(Error::corrupt_header(
            offset,
            format!("bad {record} signature {found:#010x}"),
        ));
    }
    Ok(())
}

/// End of central directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    /// Number of the disk holding this record (0-based).
    pub disk_number: u16,
    /// Disk on which the central directory starts.
    pub disk_with_cd: u16,
    /// Central directory records on this disk.
    pub disk_entries: u16,
    /// Central directory records in total.
    pub total_entries: u16,
    /// Central directory size in bytes.
    pub cd_size: u32,
    /// Central directory offset, relative to the start of `disk_with_cd`.
    pub cd_offset: u32,
    /// Length of the archive comment that follows the record.
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    /// Parses the fixed 22-byte record found at `offset`.
    pub fn parse(data: &[u8], offset: u64) -> Result<Self> {
        if data.len() < EOCD_SIZE {
            return Err(Error::corrupt_header(offset, "truncated end of central directory"));
        }
        let mut cursor = Cursor::new(data);
        expect_signature(&mut cursor, EOCD_SIGNATURE, offset, "end of central directory")?;
        let truncated =
            |_: io::Error| Error::corrupt_header(offset, "truncated end of central directory");
        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            disk_with_cd: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            disk_entries: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            total_entries: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            cd_size: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
            cd_offset: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
            comment_len: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
        })
    }

    /// Returns true if any field defers to the ZIP64 record.
    pub fn is_zip64(&self) -> bool {
        self.disk_number == SATURATED_U16
            || self.disk_with_cd == SATURATED_U16
            || self.disk_entries == SATURATED_U16
            || self.total_entries == SATURATED_U16
            || self.cd_size == SATURATED_U32
            || self.cd_offset == SATURATED_U32
    }
}

/// ZIP64 end of central directory locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zip64Locator {
    /// Disk holding the ZIP64 end of central directory record.
    pub disk_with_eocd64: u32,
    /// Offset of that record, relative to the start of its disk.
    pub eocd64_offset: u64,
    /// Total number of disks.
    pub total_disks: u32,
}

impl Zip64Locator {
    /// Parses the 20-byte locator found at `offset`.
    pub fn parse(data: &[u8], offset: u64) -> Result<Self> {
        if data.len() < ZIP64_LOCATOR_SIZE {
            return Err(Error::corrupt_header(offset, "truncated ZIP64 locator"));
        }
        let mut cursor = Cursor::new(data);
        expect_signature(&mut cursor, ZIP64_LOCATOR_SIGNATURE, offset, "ZIP64 locator")?;
        let truncated = |_: io::Error| Error::corrupt_header(offset, "truncated ZIP64 locator");
        Ok(Self {
            disk_with_eocd64: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
            eocd64_offset: cursor.read_u64::<LittleEndian>().map_err(truncated)?,
            total_disks: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
        })
    }
}

/// ZIP64 end of central directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zip64EndOfCentralDirectory {
    /// Number of the disk holding this record.
    pub disk_number: u32,
    /// Disk on which the central directory starts.
    pub disk_with_cd: u32,
    /// Central directory records on this disk.
    pub disk_entries: u64,
    /// Central directory records in total.
    pub total_entries: u64,
    /// Central directory size in bytes.
    pub cd_size: u64,
    /// Central directory offset, relative to the start of `disk_with_cd`.
    pub cd_offset: u64,
}

impl Zip64EndOfCentralDirectory {
    /// Parses the fixed part of the record found at `offset`.
    pub fn parse(data: &[u8], offset: u64) -> Result<Self> {
        if data.len() < ZIP64_EOCD_SIZE {
            return Err(Error::corrupt_header(offset, "truncated ZIP64 end of central directory"));
        }
        let mut cursor = Cursor::new(data);
        expect_signature(
            &mut cursor,
            ZIP64_EOCD_SIGNATURE,
            offset,
            "ZIP64 end of central directory",
        )?;
        let truncated =
            |_: io::Error| Error::corrupt_header(offset, "truncated ZIP64 end of central directory");
        // record size (8), version made by (2), version needed (2)
        cursor.set_position(cursor.position() + 12);
        Ok(Self {
            disk_number: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
            disk_with_cd: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
            disk_entries: cursor.read_u64::<LittleEndian>().map_err(truncated)?,
            total_entries: cursor.read_u64::<LittleEndian>().map_err(truncated)?,
            cd_size: cursor.read_u64::<LittleEndian>().map_err(truncated)?,
            cd_offset: cursor.read_u64::<LittleEndian>().map_err(truncated)?,
        })
    }
}

/// Fixed part of a central directory file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralHeader {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub method: u16,
    pub dos_time: u16,
    pub dos_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name_len: u16,
    pub extra_len: u16,
    pub comment_len: u16,
    pub disk_start: u16,
    pub internal_attributes: u16,
    pub external_attributes: u32,
    pub header_offset: u32,
}

impl CentralHeader {
    /// Parses the fixed 46-byte header found at `offset`.
    pub fn parse(data: &[u8], offset: u64) -> Result<Self> {
        if data.len() < CENTRAL_HEADER_SIZE {
            return Err(Error::corrupt_header(offset, "truncated central directory header"));
        }
        let mut cursor = Cursor::new(data);
        expect_signature(
            &mut cursor,
            CENTRAL_HEADER_SIGNATURE,
            offset,
            "central directory header",
        )?;
        let truncated =
            |_: io::Error| Error::corrupt_header(offset, "truncated central directory header");
        Ok(Self {
            version_made_by: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            version_needed: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            flags: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            method: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            dos_time: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            dos_date: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            crc32: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
            compressed_size: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
            uncompressed_size: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
            name_len: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            extra_len: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            comment_len: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            disk_start: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            internal_attributes: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            external_attributes: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
            header_offset: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
        })
    }

    /// Length of the variable part (name, extra field and comment).
    pub fn variable_len(&self) -> usize {
        usize::from(self.name_len) + usize::from(self.extra_len) + usize::from(self.comment_len)
    }
}

/// Fixed part of a local file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHeader {
    pub flags: u16,
    pub method: u16,
    pub name_len: u16,
    pub extra_len: u16,
}

impl LocalHeader {
    /// Parses the fixed 30-byte header found at `offset`.
    pub fn parse(data: &[u8], offset: u64) -> Result<Self> {
        if data.len() < LOCAL_HEADER_SIZE {
            return Err(Error::corrupt_header(offset, "truncated local header"));
        }
        let mut cursor = Cursor::new(data);
        expect_signature(&mut cursor, LOCAL_HEADER_SIGNATURE, offset, "local header")?;
        let truncated = |_: io::Error| Error::corrupt_header(offset, "truncated local header");
        // version needed (2)
        cursor.set_position(6);
        let flags = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let method = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        // time, date, crc, sizes (16)
        cursor.set_position(26);
        let name_len = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let extra_len = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        Ok(Self {
            flags,
            method,
            name_len,
            extra_len,
        })
    }
}

/// One entry of the central directory, with ZIP64 and extra fields applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Decoded entry name, `/`-delimited as stored.
    pub name: String,
    /// Name bytes exactly as stored in the central directory.
    pub raw_name: Vec<u8>,
    /// True for directory entries.
    pub is_dir: bool,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Compressed size in bytes.
    pub compressed_size: u64,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Compression method.
    pub method: CompressionMethod,
    /// General purpose bit flags.
    pub flags: u16,
    /// Logical offset of the local header in the assembled source.
    pub header_offset: u64,
    /// Disk on which the local header starts.
    pub disk_start: u32,
    /// Host system and version that wrote the entry.
    pub version_made_by: u16,
    /// Host-specific attributes.
    pub external_attributes: u32,
    /// Last modification time.
    pub modified: Option<Timestamp>,
    /// Last access time.
    pub accessed: Option<Timestamp>,
    /// Creation time.
    pub created: Option<Timestamp>,
}

impl RawEntry {
    /// Returns true if the entry data is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.flags & (flags::ENCRYPTED | flags::STRONG_ENCRYPTION) != 0
    }

    /// Returns true if the name was stored as UTF-8.
    pub fn is_utf8(&self) -> bool {
        self.flags & flags::UTF8 != 0
    }

    /// Returns Unix permission bits when the entry was written on Unix.
    pub fn unix_mode(&self) -> Option<u32> {
        const HOST_UNIX: u16 = 3;
        if self.version_made_by >> 8 == HOST_UNIX {
            Some(self.external_attributes >> 16)
        } else {
            None
        }
    }
}
