//! Decompression codecs for ZIP entry data.
//!
//! Each supported compression method has a [`Decoder`] that turns the
//! compressed byte range of an entry into its uncompressed bytes. Which
//! methods are available depends on the enabled Cargo features:
//!
//! | Method | ID | Feature |
//! |--------|----|---------|
//! | Stored | 0 | always |
//! | Deflate | 8 | `deflate` |
//! | BZip2 | 12 | `bzip2` |
//! | LZMA | 14 | `lzma` |
//! | Zstandard | 93 | `zstd` |

#[cfg(feature = "bzip2")]
pub mod bzip2;
#[cfg(feature = "deflate")]
pub mod deflate;
#[cfg(feature = "lzma")]
pub mod lzma;
#[cfg(feature = "zstd")]
pub mod zstd;

mod stored;

use std::fmt;
#[allow(unused_imports)]
use std::io::{self, BufRead, Read};

use crate::{Error, Result};

pub use stored::StoredDecoder;

#[cfg(feature = "bzip2")]
pub use self::bzip2::Bzip2Decoder;
#[cfg(feature = "deflate")]
pub use deflate::DeflateDecoder;
#[cfg(feature = "lzma")]
pub use lzma::LzmaDecoder;
#[cfg(feature = "zstd")]
pub use self::zstd::ZstdStreamDecoder;

/// A decoder that reads compressed data and produces uncompressed output.
pub trait Decoder: Read + Send {
    /// Returns the compression method this decoder handles.
    fn method(&self) -> CompressionMethod;
}

/// ZIP compression method, as stored in entry headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMethod {
    /// No compression (0).
    Stored,
    /// Deflate (8).
    Deflate,
    /// BZip2 (12).
    BZip2,
    /// LZMA (14).
    Lzma,
    /// Zstandard (93).
    Zstd,
    /// Any other method ID.
    Unknown(u16),
}

impl CompressionMethod {
    /// Maps a header method ID to a method.
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            12 => CompressionMethod::BZip2,
            14 => CompressionMethod::Lzma,
            93 => CompressionMethod::Zstd,
            other => CompressionMethod::Unknown(other),
        }
    }

    /// Returns the header method ID.
    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::BZip2 => 12,
            CompressionMethod::Lzma => 14,
            CompressionMethod::Zstd => 93,
            CompressionMethod::Unknown(v) => *v,
        }
    }

    /// Returns a human-readable name for the method.
    pub fn name(&self) -> &'static str {
        match self {
            CompressionMethod::Stored => "Stored",
            CompressionMethod::Deflate => "Deflate",
            CompressionMethod::BZip2 => "BZip2",
            CompressionMethod::Lzma => "LZMA",
            CompressionMethod::Zstd => "Zstandard",
            CompressionMethod::Unknown(_) => "Unknown",
        }
    }

    /// Returns true if this build can decode the method.
    pub fn is_supported(&self) -> bool {
        match self {
            CompressionMethod::Stored => true,
            CompressionMethod::Deflate => cfg!(feature = "deflate"),
            CompressionMethod::BZip2 => cfg!(feature = "bzip2"),
            CompressionMethod::Lzma => cfg!(feature = "lzma"),
            CompressionMethod::Zstd => cfg!(feature = "zstd"),
            CompressionMethod::Unknown(_) => false,
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::Unknown(id) => write!(f, "Unknown({id})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Builds a decoder over the compressed bytes of one entry.
///
/// # Arguments
///
/// * `input` - The entry's compressed byte range
/// * `method` - Compression method from the central directory
/// * `entry_flags` - General purpose bit flags of the entry
/// * `uncompressed_size` - Declared size of the uncompressed data
///
/// # Errors
///
/// Returns [`Error::UnsupportedMethod`] if the method is not compiled in, or
/// a codec-specific error if the stream header is invalid.
#[allow(unused_variables)]
pub(crate) fn build_decoder<R: BufRead + Send + 'static>(
    input: R,
    method: CompressionMethod,
    entry_flags: u16,
    uncompressed_size: u64,
) -> Result<Box<dyn Decoder>> {
    match method {
        CompressionMethod::Stored => Ok(Box::new(StoredDecoder::new(input, uncompressed_size))),

        #[cfg(feature = "deflate")]
        CompressionMethod::Deflate => Ok(Box::new(DeflateDecoder::new(input))),

        #[cfg(feature = "bzip2")]
        CompressionMethod::BZip2 => Ok(Box::new(Bzip2Decoder::new(input))),

        #[cfg(feature = "lzma")]
        CompressionMethod::Lzma => {
            let decoder = LzmaDecoder::new(input, entry_flags, uncompressed_size)?;
            Ok(Box::new(decoder))
        }

        #[cfg(feature = "zstd")]
        CompressionMethod::Zstd => {
            let decoder = ZstdStreamDecoder::new(input)
                .map_err(|e| Error::InvalidFormat(format!("ZSTD init error: {}", e)))?;
            Ok(Box::new(decoder))
        }

        #[allow(unreachable_patterns)]
        other => Err(Error::UnsupportedMethod {
            method: other.as_u16(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_method_ids_round_trip() {
        for id in [0u16, 8, 12, 14, 93, 99, 1234] {
            assert_eq!(CompressionMethod::from_u16(id).as_u16(), id);
        }
        assert_eq!(CompressionMethod::from_u16(99), CompressionMethod::Unknown(99));
    }

    #[test]
    fn test_display() {
        assert_eq!(CompressionMethod::Deflate.to_string(), "Deflate");
        assert_eq!(CompressionMethod::Unknown(99).to_string(), "Unknown(99)");
    }

    #[test]
    fn test_stored_always_supported() {
        assert!(CompressionMethod::Stored.is_supported());
        assert!(!CompressionMethod::Unknown(99).is_supported());
    }

    #[test]
    fn test_build_stored() {
        let mut decoder =
            build_decoder(Cursor::new(b"abc".to_vec()), CompressionMethod::Stored, 0, 3).unwrap();
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abc");
        assert_eq!(decoder.method(), CompressionMethod::Stored);
    }

    #[test]
    fn test_build_unknown() {
        let result = build_decoder(Cursor::new(Vec::new()), CompressionMethod::Unknown(99), 0, 0);
        assert!(matches!(result, Err(Error::UnsupportedMethod { method: 99 })));
    }

    #[cfg(not(feature = "zstd"))]
    #[test]
    fn test_build_disabled_method() {
        let result = build_decoder(Cursor::new(Vec::new()), CompressionMethod::Zstd, 0, 0);
        assert!(matches!(result, Err(Error::UnsupportedMethod { method: 93 })));
        assert!(!CompressionMethod::Zstd.is_supported());
    }
}
