//! Zstandard (method 93).
//!
//! A ZIP entry holds exactly one Zstandard frame. The decoder reads straight
//! from the entry's buffered range and stops at the end of that frame.

use std::fmt;
use std::io::{self, BufRead, Read};

use zstd::stream::read::Decoder as FrameDecoder;

use super::{CompressionMethod, Decoder};

/// Zstandard frame decoder.
pub struct ZstdStreamDecoder<R: BufRead> {
    inner: FrameDecoder<'static, R>,
}

impl<R: BufRead> fmt::Debug for ZstdStreamDecoder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZstdStreamDecoder").finish_non_exhaustive()
    }
}

impl<R: BufRead + Send> ZstdStreamDecoder<R> {
    /// Creates a decoder over one frame read from `input`.
    pub fn new(input: R) -> io::Result<Self> {
        let inner = FrameDecoder::with_buffer(input)?.single_frame();
        Ok(Self { inner })
    }
}

impl<R: BufRead + Send> Read for ZstdStreamDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: BufRead + Send> Decoder for ZstdStreamDecoder<R> {
    fn method(&self) -> CompressionMethod {
        CompressionMethod::Zstd
    }
}
