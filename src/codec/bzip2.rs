//! BZip2 (method 12).

use std::fmt;
use std::io::{self, BufRead, Read};

use bzip2::bufread::BzDecoder;

use super::{CompressionMethod, Decoder};

/// BZip2 decoder reading one stream from the entry's buffered range.
pub struct Bzip2Decoder<R> {
    inner: BzDecoder<R>,
}

impl<R> fmt::Debug for Bzip2Decoder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bzip2Decoder").finish_non_exhaustive()
    }
}

impl<R: BufRead + Send> Bzip2Decoder<R> {
    /// Creates a decoder over `input`.
    pub fn new(input: R) -> Self {
        Self {
            inner: BzDecoder::new(input),
        }
    }
}

impl<R: BufRead + Send> Read for Bzip2Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: BufRead + Send> Decoder for Bzip2Decoder<R> {
    fn method(&self) -> CompressionMethod {
        CompressionMethod::BZip2
    }
}
