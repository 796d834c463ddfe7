//! Decompressing entry streams.

use std::fmt;
use std::io::{self, BufReader, Read};

use crate::codec::{CompressionMethod, Decoder, build_decoder};
use crate::format::{RawEntry, ZipReader};
use crate::volume::ReadAt;
use crate::{Error, Result};

/// A bounded window over a positional source with its own cursor.
struct SourceRange<R> {
    source: R,
    pos: u64,
    end: u64,
}

impl<R: ReadAt> Read for SourceRange<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.end.saturating_sub(self.pos);
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let len = remaining.min(buf.len() as u64) as usize;
        let n = self.source.read_at(self.pos, &mut buf[..len])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "entry data truncated",
            ));
        }
        self.pos += n as u64;
        Ok(n)
    }
}

/// A stream over the uncompressed bytes of one entry.
///
/// Each stream has its own cursor, so several may be read concurrently.
/// When verification is enabled the CRC-32 and length of the produced data
/// are checked at end of stream; a mismatch is returned as an
/// [`io::ErrorKind::InvalidData`] error wrapping [`Error::CrcMismatch`] or
/// [`Error::SizeMismatch`].
pub struct EntryReader {
    name: String,
    method: Option<CompressionMethod>,
    decoder: Option<Box<dyn Decoder>>,
    hasher: crc32fast::Hasher,
    produced: u64,
    expected_size: u64,
    expected_crc: u32,
    verify: bool,
}

impl fmt::Debug for EntryReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryReader")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("produced", &self.produced)
            .field("expected_size", &self.expected_size)
            .finish_non_exhaustive()
    }
}

impl EntryReader {
    /// A stream that yields no bytes, for directories.
    pub(crate) fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            method: None,
            decoder: None,
            hasher: crc32fast::Hasher::new(),
            produced: 0,
            expected_size: 0,
            expected_crc: 0,
            verify: false,
        }
    }

    /// Validates the local header of `entry` and opens a decoder over its data.
    pub(crate) fn open<R>(reader: &ZipReader<R>, entry: &RawEntry, verify: bool) -> Result<Self>
    where
        R: ReadAt + Clone + 'static,
    {
        let start = reader.data_offset(entry)?;
        let range = SourceRange {
            source: reader.source().clone(),
            pos: start,
            end: start + entry.compressed_size,
        };
        let decoder = build_decoder(
            BufReader::new(range),
            entry.method,
            entry.flags,
            entry.size,
        )?;

        Ok(Self {
            name: entry.name.clone(),
            method: Some(decoder.method()),
            decoder: Some(decoder),
            hasher: crc32fast::Hasher::new(),
            produced: 0,
            expected_size: entry.size,
            expected_crc: entry.crc32,
            verify,
        })
    }

    /// Returns the raw name of the entry being read.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the compression method, or `None` for directories.
    pub fn method(&self) -> Option<CompressionMethod> {
        self.method
    }

    /// Returns the uncompressed size recorded in the archive.
    pub fn size(&self) -> u64 {
        self.expected_size
    }

    /// Returns the number of bytes produced so far.
    pub fn bytes_read(&self) -> u64 {
        self.produced
    }

    fn size_mismatch(&self) -> io::Error {
        Error::SizeMismatch {
            name: self.name.clone(),
            expected: self.expected_size,
            actual: self.produced,
        }
        .into_io()
    }

    fn finish(&mut self) -> io::Result<()> {
        self.decoder = None;
        if !self.verify {
            return Ok(());
        }
        if self.produced != self.expected_size {
            return Err(self.size_mismatch());
        }
        let actual = self.hasher.clone().finalize();
        if actual != self.expected_crc {
            return Err(Error::CrcMismatch {
                name: self.name.clone(),
                expected: self.expected_crc,
                actual,
            }
            .into_io());
        }
        Ok(())
    }
}

impl Read for EntryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(decoder) = self.decoder.as_mut() else {
            return Ok(0);
        };
        if buf.is_empty() {
            return Ok(0);
        }

        let n = decoder.read(buf)?;
        if n == 0 {
            self.finish()?;
            return Ok(0);
        }

        self.hasher.update(&buf[..n]);
        self.produced += n as u64;
        if self.verify && self.produced > self.expected_size {
            self.decoder = None;
            return Err(self.size_mismatch());
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::testing::{set_crc, stored_archive};

    fn open(archive: Vec<u8>, verify: bool) -> Result<EntryReader> {
        let reader = ZipReader::new(std::sync::Arc::new(archive));
        let entry = reader.entries()?.remove(0);
        EntryReader::open(&reader, &entry, verify)
    }

    #[test]
    fn test_read_stored() {
        let mut stream = open(stored_archive(&[("a.txt", b"alpha")], b""), true).unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"alpha");
        assert_eq!(stream.bytes_read(), 5);
        assert_eq!(stream.method(), Some(CompressionMethod::Stored));
    }

    #[test]
    fn test_crc_mismatch() {
        let mut archive = stored_archive(&[("a.txt", b"alpha")], b"");
        set_crc(&mut archive, 0xDEAD_BEEF);
        let mut stream = open(archive, true).unwrap();
        let mut out = Vec::new();
        let err = stream.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(matches!(
            Error::from_stream(err),
            Error::CrcMismatch { expected: 0xDEAD_BEEF, .. }
        ));
    }

    #[test]
    fn test_crc_mismatch_ignored_without_verify() {
        let mut archive = stored_archive(&[("a.txt", b"alpha")], b"");
        set_crc(&mut archive, 0xDEAD_BEEF);
        let mut stream = open(archive, false).unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"alpha");
    }

    #[test]
    fn test_empty_stream() {
        let mut stream = EntryReader::empty("dir/");
        let mut out = Vec::new();
        assert_eq!(stream.read_to_end(&mut out).unwrap(), 0);
        assert_eq!(stream.method(), None);
    }
}
