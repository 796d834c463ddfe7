//! LZMA (method 14).
//!
//! ZIP stores LZMA data behind a 4-byte header: the LZMA SDK version (2 bytes)
//! and the properties length (2 bytes, normally 5), followed by the
//! properties themselves (1 byte lc/lp/pb, 4 bytes dictionary size). When
//! general purpose bit 1 is set the stream ends with an end-of-stream marker
//! and the declared size is not needed to find the end.

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use super::{CompressionMethod, Decoder};
use crate::format::flags;
use crate::{Error, Result};

/// Size of the LZMA properties block.
const PROPERTIES_SIZE: u16 = 5;

/// LZMA decoder for ZIP entries.
pub struct LzmaDecoder<R> {
    inner: lzma_rust2::LzmaReader<R>,
}

impl<R> std::fmt::Debug for LzmaDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LzmaDecoder").finish_non_exhaustive()
    }
}

impl<R: Read + Send> LzmaDecoder<R> {
    /// Reads the ZIP LZMA header from `input` and prepares the decoder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the header is truncated or the
    /// properties are not understood.
    pub fn new(mut input: R, entry_flags: u16, uncompressed_size: u64) -> Result<Self> {
        let bad_header = |reason: &str| Error::InvalidFormat(format!("LZMA header: {reason}"));

        let _version = input
            .read_u16::<LittleEndian>()
            .map_err(|_| bad_header("truncated"))?;
        let props_len = input
            .read_u16::<LittleEndian>()
            .map_err(|_| bad_header("truncated"))?;
        if props_len != PROPERTIES_SIZE {
            return Err(bad_header(&format!("unexpected properties size {props_len}")));
        }
        let mut props = [0u8; PROPERTIES_SIZE as usize];
        input
            .read_exact(&mut props)
            .map_err(|_| bad_header("truncated properties"))?;
        let dict_size = u32::from_le_bytes([props[1], props[2], props[3], props[4]]);

        let unpack_size = if entry_flags & flags::LZMA_EOS_MARKER != 0 {
            u64::MAX
        } else {
            uncompressed_size
        };

        let reader =
            lzma_rust2::LzmaReader::new_with_props(input, unpack_size, props[0], dict_size, None)
                .map_err(|e| Error::InvalidFormat(format!("LZMA header: {}", e)))?;

        Ok(Self { inner: reader })
    }
}

impl<R: Read + Send> Read for LzmaDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> Decoder for LzmaDecoder<R> {
    fn method(&self) -> CompressionMethod {
        CompressionMethod::Lzma
    }
}
