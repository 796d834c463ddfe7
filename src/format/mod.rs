//! ZIP archive format constants, record layouts, and the central-directory
//! reader.
//!
//! A ZIP archive is read from the end: the end-of-central-directory record
//! (and, for large archives, its ZIP64 counterpart) locates the central
//! directory, which lists every entry with the offset of its local header.

pub mod extra;
pub mod names;
pub mod parser;
pub mod structures;

#[cfg(test)]
pub(crate) mod testing;

pub use parser::ZipReader;
pub use structures::RawEntry;

/// Local file header signature (`PK\x03\x04`).
pub const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;

/// Central directory file header signature (`PK\x01\x02`).
pub const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;

/// End of central directory signature (`PK\x05\x06`).
pub const EOCD_SIGNATURE: u32 = 0x0605_4b50;

/// ZIP64 end of central directory signature (`PK\x06\x06`).
pub const ZIP64_EOCD_SIGNATURE: u32 = 0x0606_4b50;

/// ZIP64 end of central directory locator signature (`PK\x06\x07`).
pub const ZIP64_LOCATOR_SIGNATURE: u32 = 0x0706_4b50;

/// Fixed part of the local file header.
pub const LOCAL_HEADER_SIZE: usize = 30;

/// Fixed part of a central directory file header.
pub const CENTRAL_HEADER_SIZE: usize = 46;

/// End of central directory record without its comment.
pub const EOCD_SIZE: usize = 22;

/// ZIP64 end of central directory locator.
pub const ZIP64_LOCATOR_SIZE: usize = 20;

/// Fixed part of the ZIP64 end of central directory record.
pub const ZIP64_EOCD_SIZE: usize = 56;

/// Largest archive comment the format can describe.
pub const MAX_COMMENT_SIZE: usize = u16::MAX as usize;

/// General purpose bit flags.
pub mod flags {
    /// Entry data is encrypted.
    pub const ENCRYPTED: u16 = 1 << 0;
    /// LZMA data carries an end-of-stream marker.
    pub const LZMA_EOS_MARKER: u16 = 1 << 1;
    /// Sizes and CRC follow the data in a data descriptor.
    pub const DATA_DESCRIPTOR: u16 = 1 << 3;
    /// Strong (certificate or AES) encryption.
    pub const STRONG_ENCRYPTION: u16 = 1 << 6;
    /// Name and comment are UTF-8.
    pub const UTF8: u16 = 1 << 11;
}

/// Extra field header IDs this crate understands.
pub mod extra_id {
    /// ZIP64 extended information.
    pub const ZIP64: u16 = 0x0001;
    /// NTFS timestamps (Windows FILETIME).
    pub const NTFS: u16 = 0x000A;
    /// Extended timestamp (Unix seconds).
    pub const EXTENDED_TIMESTAMP: u16 = 0x5455;
    /// Info-ZIP Unicode path.
    pub const UNICODE_PATH: u16 = 0x7075;
}

/// Value of a 16-bit field that defers to the ZIP64 record.
pub(crate) const SATURATED_U16: u16 = u16::MAX;

/// Value of a 32-bit field that defers to the ZIP64 record.
pub(crate) const SATURATED_U32: u32 = u32::MAX;
