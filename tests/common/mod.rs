//! Shared test utilities for integration tests.
//!
//! [`ZipBuilder`] writes small ZIP archives in memory: stored and deflated
//! entries, explicit directories, arbitrary raw names and extra fields. It
//! can also split its output into `.z01`, `.z02`, ..., `.zip` segments with
//! disk-relative offsets, the way `zip -s` does.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

const LOCAL_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_SIGNATURE: u32 = 0x0201_4b50;
const EOCD_SIGNATURE: u32 = 0x0605_4b50;

/// General purpose flag: name is UTF-8.
pub const FLAG_UTF8: u16 = 1 << 11;
/// General purpose flag: entry is encrypted.
pub const FLAG_ENCRYPTED: u16 = 1;

/// One entry to be written.
#[derive(Debug, Clone)]
pub struct EntrySpec {
    pub raw_name: Vec<u8>,
    /// Bytes stored in the archive (already compressed).
    pub payload: Vec<u8>,
    pub uncompressed_size: u64,
    pub crc32: u32,
    pub method: u16,
    pub flags: u16,
    pub dos_time: u16,
    pub dos_date: u16,
    pub extra: Vec<u8>,
    pub version_made_by: u16,
    pub external_attributes: u32,
    /// Method written to the local header, if different.
    pub local_method: Option<u16>,
    /// Name written to the local header, if different.
    pub local_name: Option<Vec<u8>>,
}

impl EntrySpec {
    /// A stored entry with a UTF-8 name.
    pub fn stored(name: &str, data: &[u8]) -> Self {
        Self {
            raw_name: name.as_bytes().to_vec(),
            payload: data.to_vec(),
            uncompressed_size: data.len() as u64,
            crc32: crc32fast::hash(data),
            method: 0,
            flags: FLAG_UTF8,
            dos_time: 0,
            dos_date: 0,
            extra: Vec::new(),
            version_made_by: 20,
            external_attributes: 0,
            local_method: None,
            local_name: None,
        }
    }

    /// Sets the DOS modification time.
    pub fn dos(mut self, date: u16, time: u16) -> Self {
        self.dos_date = date;
        self.dos_time = time;
        self
    }

    /// Appends an extra field block.
    pub fn extra(mut self, id: u16, data: &[u8]) -> Self {
        self.extra.extend_from_slice(&id.to_le_bytes());
        self.extra
            .extend_from_slice(&(data.len() as u16).to_le_bytes());
        self.extra.extend_from_slice(data);
        self
    }
}

/// Builds an extended timestamp (0x5455) payload with a modification time.
pub fn extended_mtime(secs: i32) -> Vec<u8> {
    let mut data = vec![0x01];
    data.extend_from_slice(&secs.to_le_bytes());
    data
}

/// Builds an Info-ZIP Unicode path (0x7075) payload.
pub fn unicode_path(raw_name: &[u8], name: &str) -> Vec<u8> {
    let mut data = vec![1];
    data.extend_from_slice(&crc32fast::hash(raw_name).to_le_bytes());
    data.extend_from_slice(name.as_bytes());
    data
}

/// In-memory ZIP writer.
#[derive(Debug, Clone, Default)]
pub struct ZipBuilder {
    entries: Vec<EntrySpec>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stored file.
    pub fn file(self, name: &str, data: &[u8]) -> Self {
        self.entry(EntrySpec::stored(name, data))
    }

    /// Adds a Deflate-compressed file.
    #[cfg(feature = "deflate")]
    pub fn deflated(self, name: &str, data: &[u8]) -> Self {
        use flate2::Compression;
        use flate2::write::DeflateEncoder;
        use std::io::Write;

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        let mut spec = EntrySpec::stored(name, data);
        spec.payload = encoder.finish().unwrap();
        spec.method = 8;
        self.entry(spec)
    }

    /// Adds an explicit directory entry. `name` should end with `/`.
    pub fn dir(self, name: &str) -> Self {
        self.entry(EntrySpec::stored(name, b""))
    }

    /// Adds a fully specified entry.
    pub fn entry(mut self, spec: EntrySpec) -> Self {
        self.entries.push(spec);
        self
    }

    /// Writes a single-segment archive.
    pub fn build(&self) -> Vec<u8> {
        let (data, central) = self.layout(&[]);
        let mut out = data;
        let cd_offset = out.len() as u32;
        let cd_size = central.len() as u32;
        out.extend_from_slice(&central);
        self.write_eocd(&mut out, 0, 0, cd_size, cd_offset);
        out
    }

    /// Writes a split archive and returns the bytes of each segment.
    ///
    /// `boundaries` are the logical offsets at which the second, third, ...
    /// segments start. They must be increasing and fall before the end of
    /// the central directory.
    pub fn build_split(&self, boundaries: &[u64]) -> Vec<Vec<u8>> {
        let (data, central) = self.layout(boundaries);
        let cd_start = data.len() as u64;
        let cd_end = cd_start + central.len() as u64;
        assert!(
            boundaries.windows(2).all(|w| w[0] < w[1]),
            "boundaries must increase"
        );
        assert!(
            boundaries.last().is_none_or(|&b| b > 0 && b <= cd_end),
            "the last segment must hold the end of central directory"
        );

        let (cd_disk, cd_offset) = locate(boundaries, cd_start);
        let mut out = data;
        out.extend_from_slice(&central);
        self.write_eocd(
            &mut out,
            boundaries.len() as u16,
            cd_disk as u16,
            central.len() as u32,
            cd_offset as u32,
        );

        let mut segments = Vec::new();
        let mut start = 0usize;
        for &boundary in boundaries {
            segments.push(out[start..boundary as usize].to_vec());
            start = boundary as usize;
        }
        segments.push(out[start..].to_vec());
        segments
    }

    /// Writes the archive to `dir/<base>.zip`.
    pub fn write_to(&self, dir: &Path, base: &str) -> PathBuf {
        let path = dir.join(format!("{base}.zip"));
        std::fs::write(&path, self.build()).unwrap();
        path
    }

    /// Writes a split archive to `dir/<base>.z01`, ..., `dir/<base>.zip`.
    ///
    /// Returns the segment paths in archive order.
    pub fn write_split(&self, dir: &Path, base: &str, boundaries: &[u64]) -> Vec<PathBuf> {
        let segments = self.build_split(boundaries);
        let count = segments.len();
        segments
            .into_iter()
            .enumerate()
            .map(|(i, bytes)| {
                let path = if i + 1 == count {
                    dir.join(format!("{base}.zip"))
                } else {
                    dir.join(format!("{base}.z{:02}", i + 1))
                };
                std::fs::write(&path, bytes).unwrap();
                path
            })
            .collect()
    }

    /// Writes local records and the central directory.
    fn layout(&self, boundaries: &[u64]) -> (Vec<u8>, Vec<u8>) {
        let mut data = Vec::new();
        let mut central = Vec::new();

        for spec in &self.entries {
            let (disk, offset) = locate(boundaries, data.len() as u64);
            let local_name = spec.local_name.as_ref().unwrap_or(&spec.raw_name);

            put32(&mut data, LOCAL_SIGNATURE);
            put16(&mut data, 20);
            put16(&mut data, spec.flags);
            put16(&mut data, spec.local_method.unwrap_or(spec.method));
            put16(&mut data, spec.dos_time);
            put16(&mut data, spec.dos_date);
            put32(&mut data, spec.crc32);
            put32(&mut data, spec.payload.len() as u32);
            put32(&mut data, spec.uncompressed_size as u32);
            put16(&mut data, local_name.len() as u16);
            put16(&mut data, 0);
            data.extend_from_slice(local_name);
            data.extend_from_slice(&spec.payload);

            put32(&mut central, CENTRAL_SIGNATURE);
            put16(&mut central, spec.version_made_by);
            put16(&mut central, 20);
            put16(&mut central, spec.flags);
            put16(&mut central, spec.method);
            put16(&mut central, spec.dos_time);
            put16(&mut central, spec.dos_date);
            put32(&mut central, spec.crc32);
            put32(&mut central, spec.payload.len() as u32);
            put32(&mut central, spec.uncompressed_size as u32);
            put16(&mut central, spec.raw_name.len() as u16);
            put16(&mut central, spec.extra.len() as u16);
            put16(&mut central, 0);
            put16(&mut central, disk as u16);
            put16(&mut central, 0);
            put32(&mut central, spec.external_attributes);
            put32(&mut central, offset as u32);
            central.extend_from_slice(&spec.raw_name);
            central.extend_from_slice(&spec.extra);
        }

        (data, central)
    }

    fn write_eocd(&self, out: &mut Vec<u8>, disk: u16, cd_disk: u16, cd_size: u32, cd_offset: u32) {
        let count = self.entries.len() as u16;
        put32(out, EOCD_SIGNATURE);
        put16(out, disk);
        put16(out, cd_disk);
        put16(out, count);
        put16(out, count);
        put32(out, cd_size);
        put32(out, cd_offset);
        put16(out, 0);
    }
}

/// Returns the disk holding logical offset `pos` and the offset within it.
fn locate(boundaries: &[u64], pos: u64) -> (usize, u64) {
    let disk = boundaries.iter().take_while(|&&b| b <= pos).count();
    let start = if disk == 0 { 0 } else { boundaries[disk - 1] };
    (disk, pos - start)
}

fn put16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Encodes a DOS date.
pub fn dos_date(year: u16, month: u16, day: u16) -> u16 {
    ((year - 1980) << 9) | (month << 5) | day
}

/// Encodes a DOS time.
pub fn dos_time(hour: u16, minute: u16, second: u16) -> u16 {
    (hour << 11) | (minute << 5) | (second / 2)
}
