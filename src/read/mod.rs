//! Archive indexing and entry reading.
//!
//! This module turns the raw central directory into the lookup tables used
//! by [`ZipFileSystem`](crate::ZipFileSystem), and provides the types the
//! filesystem hands out: resolved nodes, attributes, directory entries and
//! decompressing entry streams.
//!
//! # Example
//!
//! ```rust
//! use zipvfs::format::ZipReader;
//! use zipvfs::read::ArchiveIndex;
//!
//! # fn main() -> zipvfs::Result<()> {
//! # let bytes = vec![0x50, 0x4b, 0x05, 0x06, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
//! let reader = ZipReader::new(bytes);
//! let index = ArchiveIndex::build(reader.entries()?)?;
//! for (path, entry) in index.iter() {
//!     println!("{} <- {}", path, entry.name());
//! }
//! # Ok(())
//! # }
//! ```

mod entry;
mod index;
mod options;
mod stream;

pub use entry::{DirEntry, FileAttributes, IndexedEntry, Node};
pub use index::ArchiveIndex;
pub use options::OpenOptions;
pub use stream::EntryReader;
