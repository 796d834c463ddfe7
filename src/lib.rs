//! # zipvfs
//!
//! A read-only virtual filesystem over single and split ZIP archives.
//!
//! The crate discovers the segments of a split archive (`.z01`, `.z02`, ...,
//! `.zip`), presents them as one positional byte source, indexes the central
//! directory into a collision-free tree of virtual paths, and answers
//! filesystem queries against that tree.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zipvfs::{Result, ZipFileSystem};
//!
//! fn main() -> Result<()> {
//!     // Any segment of the archive opens the whole set
//!     let fs = ZipFileSystem::open("photos.z01")?;
//!
//!     for entry in fs.read_dir("/")? {
//!         let kind = if entry.is_dir() { "dir " } else { "file" };
//!         println!("{} {} ({} bytes)", kind, entry.path(), entry.size());
//!     }
//!
//!     let bytes = fs.read_to_vec("albums/2024/cover.jpg")?;
//!     println!("cover is {} bytes", bytes.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Synthetic Directories
//!
//! Some archive tools leave out the directory entries above their content.
//! When every entry shares an ancestor chain (e.g. only `proj/a/file.txt`
//! and `proj/a/b/file2.txt` are stored), the index manufactures the missing
//! directories and peels all but the innermost of them off every path:
//!
//! | Raw name | Virtual path |
//! |----------|--------------|
//! | `proj/a/` (synthetic) | `/a` |
//! | `proj/a/file.txt` | `/a/file.txt` |
//! | `proj/a/b/file2.txt` | `/a/b/file2.txt` |
//!
//! [`ZipFileSystem::top_entries`] lists the synthetic chain, and
//! [`ZipFileSystem::raw_name`] / [`ZipFileSystem::path_of`] map between raw
//! names and virtual paths in both directions.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `deflate` | Yes | Deflate (method 8) |
//! | `bzip2` | Yes | BZip2 (method 12) |
//! | `lzma` | Yes | LZMA (method 14) |
//! | `zstd` | No | Zstandard (method 93) |
//! | `cli` | No | Command-line inspection tool |
//!
//! Entries using a method that is not compiled in exist in the tree, but
//! reading them fails with [`Error::AccessDenied`].
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`:
//!
//! ```rust,no_run
//! use zipvfs::{Error, ZipFileSystem};
//!
//! fn size_of(archive: &str, path: &str) -> zipvfs::Result<Option<u64>> {
//!     let fs = ZipFileSystem::open(archive)?;
//!     match fs.attributes(path) {
//!         Ok(attrs) => Ok(Some(attrs.size)),
//!         Err(Error::NotFound { .. }) => Ok(None),
//!         Err(e @ Error::AccessDenied { .. }) => {
//!             eprintln!("{}", e);
//!             Ok(None)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! # fn main() {}
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: `debug` for segment
//! resolution, central directory location and index summaries, `trace` for
//! every indexed entry, and `warn` for entries it skips.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
pub mod error;
pub mod format;
pub mod fs;
pub mod read;
pub mod timestamp;
pub mod virtual_path;
pub mod volume;

pub use codec::CompressionMethod;
pub use error::{Error, Result};
pub use format::RawEntry;
pub use fs::{Operation, ZipFileSystem};
pub use read::{DirEntry, EntryReader, FileAttributes, IndexedEntry, Node, OpenOptions};
pub use timestamp::Timestamp;
pub use virtual_path::VirtualPath;
pub use volume::ReadAt;
