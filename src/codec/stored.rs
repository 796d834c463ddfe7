//! Stored entries (method 0).

use std::io::{self, Read, Take};

use super::{CompressionMethod, Decoder};

/// Passes an entry's bytes through unchanged.
///
/// Reads stop at the declared size even if the range holds more bytes.
pub struct StoredDecoder<R> {
    inner: Take<R>,
}

impl<R: Read + Send> StoredDecoder<R> {
    /// Creates a decoder that yields at most `size` bytes of `inner`.
    pub fn new(inner: R, size: u64) -> Self {
        Self {
            inner: inner.take(size),
        }
    }

    /// Returns how many declared bytes have not been produced yet.
    pub fn remaining(&self) -> u64 {
        self.inner.limit()
    }
}

impl<R: Read + Send> Read for StoredDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> Decoder for StoredDecoder<R> {
    fn method(&self) -> CompressionMethod {
        CompressionMethod::Stored
    }
}
