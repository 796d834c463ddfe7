//! Deflate (method 8).

use std::io::{self, BufRead, Read};

use flate2::bufread::DeflateDecoder as FlateDecoder;

use super::{CompressionMethod, Decoder};

/// Raw Deflate decoder.
pub struct DeflateDecoder<R> {
    inner: FlateDecoder<R>,
}

impl<R> std::fmt::Debug for DeflateDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeflateDecoder").finish_non_exhaustive()
    }
}

impl<R: BufRead + Send> DeflateDecoder<R> {
    /// Creates a new Deflate decoder over a buffered input.
    pub fn new(input: R) -> Self {
        Self {
            inner: FlateDecoder::new(input),
        }
    }
}

impl<R: BufRead + Send> Read for DeflateDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: BufRead + Send> Decoder for DeflateDecoder<R> {
    fn method(&self) -> CompressionMethod {
        CompressionMethod::Deflate
    }
}
