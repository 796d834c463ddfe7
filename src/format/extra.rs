//! Extra field parsing.
//!
//! An extra field is a sequence of `(id: u16, len: u16, data[len])` blocks.
//! Unknown blocks are skipped. A block whose declared length runs past the
//! end of the field ends parsing; some writers pad extra fields with zeros.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use super::extra_id;
use crate::timestamp::Timestamp;
use crate::{Error, Result};

/// Which central directory fields were saturated and must come from the
/// ZIP64 extra block, in the order the block stores them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zip64Needs {
    pub size: bool,
    pub compressed_size: bool,
    pub header_offset: bool,
    pub disk_start: bool,
}

impl Zip64Needs {
    fn any(&self) -> bool {
        self.size || self.compressed_size || self.header_offset || self.disk_start
    }
}

/// Info-ZIP Unicode path block (`0x7075`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnicodePath {
    /// CRC-32 of the raw header name this path replaces.
    pub name_crc32: u32,
    /// The UTF-8 path.
    pub name: String,
}

/// The extra-field values this crate uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraFields {
    pub size: Option<u64>,
    pub compressed_size: Option<u64>,
    pub header_offset: Option<u64>,
    pub disk_start: Option<u32>,
    pub modified: Option<Timestamp>,
    pub accessed: Option<Timestamp>,
    pub created: Option<Timestamp>,
    pub unicode_path: Option<UnicodePath>,
}

/// Parses a central directory extra field.
///
/// `offset` is the logical offset of the owning header, used in errors.
///
/// # Errors
///
/// Returns [`Error::CorruptHeader`] if a saturated field has no ZIP64 value.
pub fn parse_extra(data: &[u8], needs: Zip64Needs, offset: u64) -> Result<ExtraFields> {
    let mut fields = ExtraFields::default();
    let mut pos = 0usize;

    while pos + 4 <= data.len() {
        let id = u16::from_le_bytes([data[pos], data[pos + 1]]);
        let len = usize::from(u16::from_le_bytes([data[pos + 2], data[pos + 3]]));
        let start = pos + 4;
        let Some(block) = data.get(start..start + len) else {
            break;
        };
        match id {
            extra_id::ZIP64 => parse_zip64(block, needs, &mut fields),
            extra_id::EXTENDED_TIMESTAMP => parse_extended_timestamp(block, &mut fields),
            extra_id::NTFS => parse_ntfs(block, &mut fields),
            extra_id::UNICODE_PATH => fields.unicode_path = parse_unicode_path(block),
            _ => {}
        }
        pos = start + len;
    }

    if needs.any() {
        let missing = (needs.size && fields.size.is_none())
            || (needs.compressed_size && fields.compressed_size.is_none())
            || (needs.header_offset && fields.header_offset.is_none())
            || (needs.disk_start && fields.disk_start.is_none());
        if missing {
            return Err(Error::corrupt_header(
                offset,
                "saturated header field without ZIP64 extra value",
            ));
        }
    }

    Ok(fields)
}

fn parse_zip64(block: &[u8], needs: Zip64Needs, fields: &mut ExtraFields) {
    let mut cursor = Cursor::new(block);
    if needs.size {
        fields.size = cursor.read_u64::<LittleEndian>().ok();
    }
    if needs.compressed_size {
        fields.compressed_size = cursor.read_u64::<LittleEndian>().ok();
    }
    if needs.header_offset {
        fields.header_offset = cursor.read_u64::<LittleEndian>().ok();
    }
    if needs.disk_start {
        fields.disk_start = cursor.read_u32::<LittleEndian>().ok();
    }
}

fn parse_extended_timestamp(block: &[u8], fields: &mut ExtraFields) {
    let mut cursor = Cursor::new(block);
    let Ok(present) = cursor.read_u8() else {
        return;
    };
    let mut next = |bit: u8| {
        if present & bit == 0 {
            return None;
        }
        let secs = cursor.read_i32::<LittleEndian>().ok()?;
        Timestamp::from_unix_secs(i64::from(secs))
    };
    // The central directory copy usually carries only the modification time
    // even when the flags announce all three.
    let modified = next(0x01);
    let accessed = next(0x02);
    let created = next(0x04);
    fields.modified = modified.or(fields.modified);
    fields.accessed = accessed.or(fields.accessed);
    fields.created = created.or(fields.created);
}

fn parse_ntfs(block: &[u8], fields: &mut ExtraFields) {
    const TAG_TIMES: u16 = 0x0001;
    let mut cursor = Cursor::new(block);
    // reserved
    if cursor.read_u32::<LittleEndian>().is_err() {
        return;
    }
    while let (Ok(tag), Ok(size)) = (
        cursor.read_u16::<LittleEndian>(),
        cursor.read_u16::<LittleEndian>(),
    ) {
        if tag == TAG_TIMES && size >= 24 {
            let times: Vec<u64> = (0..3)
                .map_while(|_| cursor.read_u64::<LittleEndian>().ok())
                .collect();
            if let [mtime, atime, ctime] = times[..] {
                let stamp = |ft: u64| (ft != 0).then(|| Timestamp::from_filetime(ft));
                fields.modified = stamp(mtime).or(fields.modified);
                fields.accessed = stamp(atime).or(fields.accessed);
                fields.created = stamp(ctime).or(fields.created);
            }
            return;
        }
        cursor.set_position(cursor.position() + u64::from(size));
    }
}

fn parse_unicode_path(block: &[u8]) -> Option<UnicodePath> {
    let (&version, rest) = block.split_first()?;
    if version != 1 || rest.len() < 4 {
        return None;
    }
    let name_crc32 = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]);
    let name = std::str::from_utf8(&rest[4..]).ok()?.to_string();
    Some(UnicodePath { name_crc32, name })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: u16, data: &[u8]) -> Vec<u8> {
        let mut out = id.to_le_bytes().to_vec();
        out.extend_from_slice(&(data.len() as u16).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn test_empty_extra() {
        let fields = parse_extra(&[], Zip64Needs::default(), 0).unwrap();
        assert_eq!(fields, ExtraFields::default());
    }

    #[test]
    fn test_zip64_values_in_order() {
        let mut data = Vec::new();
        data.extend_from_slice(&5_000_000_000u64.to_le_bytes());
        data.extend_from_slice(&6_000_000_000u64.to_le_bytes());
        let extra = block(extra_id::ZIP64, &data);
        let needs = Zip64Needs {
            size: false,
            compressed_size: true,
            header_offset: true,
            disk_start: false,
        };
        let fields = parse_extra(&extra, needs, 0).unwrap();
        assert_eq!(fields.size, None);
        assert_eq!(fields.compressed_size, Some(5_000_000_000));
        assert_eq!(fields.header_offset, Some(6_000_000_000));
    }

    #[test]
    fn test_zip64_missing_is_corrupt() {
        let needs = Zip64Needs {
            size: true,
            ..Zip64Needs::default()
        };
        let err = parse_extra(&[], needs, 99).unwrap_err();
        assert!(matches!(err, Error::CorruptHeader { offset: 99, .. }));
    }

    #[test]
    fn test_extended_timestamp() {
        let mut data = vec![0x01];
        data.extend_from_slice(&1_700_000_000i32.to_le_bytes());
        let fields = parse_extra(
            &block(extra_id::EXTENDED_TIMESTAMP, &data),
            Zip64Needs::default(),
            0,
        )
        .unwrap();
        assert_eq!(fields.modified, Timestamp::from_unix_secs(1_700_000_000));
        assert_eq!(fields.accessed, None);
    }

    #[test]
    fn test_extended_timestamp_flags_without_values() {
        let mut data = vec![0x07];
        data.extend_from_slice(&42i32.to_le_bytes());
        let fields = parse_extra(
            &block(extra_id::EXTENDED_TIMESTAMP, &data),
            Zip64Needs::default(),
            0,
        )
        .unwrap();
        assert_eq!(fields.modified, Timestamp::from_unix_secs(42));
        assert_eq!(fields.accessed, None);
        assert_eq!(fields.created, None);
    }

    #[test]
    fn test_ntfs_times() {
        let mut data = 0u32.to_le_bytes().to_vec();
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&24u16.to_le_bytes());
        data.extend_from_slice(&300u64.to_le_bytes());
        data.extend_from_slice(&200u64.to_le_bytes());
        data.extend_from_slice(&100u64.to_le_bytes());
        let fields = parse_extra(&block(extra_id::NTFS, &data), Zip64Needs::default(), 0).unwrap();
        assert_eq!(fields.modified, Some(Timestamp::from_filetime(300)));
        assert_eq!(fields.accessed, Some(Timestamp::from_filetime(200)));
        assert_eq!(fields.created, Some(Timestamp::from_filetime(100)));
    }

    #[test]
    fn test_unicode_path() {
        let mut data = vec![1u8];
        data.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        data.extend_from_slice("ファイル.txt".as_bytes());
        let fields = parse_extra(
            &block(extra_id::UNICODE_PATH, &data),
            Zip64Needs::default(),
            0,
        )
        .unwrap();
        let path = fields.unicode_path.unwrap();
        assert_eq!(path.name_crc32, 0xDEADBEEF);
        assert_eq!(path.name, "ファイル.txt");
    }

    #[test]
    fn test_unknown_and_truncated_blocks() {
        let mut extra = block(0xCAFE, &[1, 2, 3]);
        let mut ts = vec![0x01];
        ts.extend_from_slice(&7i32.to_le_bytes());
        extra.extend_from_slice(&block(extra_id::EXTENDED_TIMESTAMP, &ts));
        // Declares 200 bytes but holds 2.
        extra.extend_from_slice(&[0x01, 0x00, 200, 0, 0, 0]);
        let fields = parse_extra(&extra, Zip64Needs::default(), 0).unwrap();
        assert_eq!(fields.modified, Timestamp::from_unix_secs(7));
    }
}
