//! Error types for archive filesystem operations.
//!
//! This module provides the [`Error`] enum which represents every failure mode
//! of opening and navigating a ZIP archive, along with a convenient
//! [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. Errors are
//! grouped into categories that tell the caller whether the whole archive is
//! unusable (configuration, format and structural errors, raised at open time)
//! or only a single call failed (not found, access denied, unsupported).
//!
//! ```rust,no_run
//! use zipvfs::{Error, ZipFileSystem};
//!
//! fn describe(path: &str) -> zipvfs::Result<()> {
//!     let fs = match ZipFileSystem::open(path) {
//!         Ok(fs) => fs,
//!         Err(e) if e.is_configuration() => {
//!             eprintln!("Not an archive we can open: {}", e);
//!             return Err(e);
//!         }
//!         Err(e @ Error::PathCollision { .. }) => {
//!             eprintln!("Archive is ambiguous: {}", e);
//!             return Err(e);
//!         }
//!         Err(e) => return Err(e),
//!     };
//!
//!     match fs.attributes("docs/readme.txt") {
//!         Ok(attrs) => println!("{} bytes", attrs.size),
//!         Err(e) if e.is_not_found() => println!("no readme"),
//!         Err(e) => return Err(e),
//!     }
//!     Ok(())
//! }
//! ```

use std::io;

use crate::fs::Operation;

/// The main error type for archive filesystem operations.
///
/// # Error Categories
///
/// | Category | Variants | Raised |
/// |----------|----------|--------|
/// | Configuration | [`InvalidConfig`][Self::InvalidConfig], [`NoSegments`][Self::NoSegments] | at open, before any file is held |
/// | Format | [`InvalidFormat`][Self::InvalidFormat], [`CorruptHeader`][Self::CorruptHeader], [`IncompleteArchive`][Self::IncompleteArchive], [`ResourceLimitExceeded`][Self::ResourceLimitExceeded] | at open |
/// | Structural | [`DuplicateEntryName`][Self::DuplicateEntryName], [`PathCollision`][Self::PathCollision] | at open |
/// | Lookup | [`NotFound`][Self::NotFound] | per call |
/// | Access | [`AccessDenied`][Self::AccessDenied] | per call |
/// | Compatibility | [`Unsupported`][Self::Unsupported], [`UnsupportedMethod`][Self::UnsupportedMethod], [`UnsupportedFeature`][Self::UnsupportedFeature] | per call |
/// | Integrity | [`CrcMismatch`][Self::CrcMismatch], [`SizeMismatch`][Self::SizeMismatch] | while streaming |
/// | I/O | [`Io`][Self::Io], [`SegmentUnavailable`][Self::SegmentUnavailable] | anywhere |
/// | Lifecycle | [`Closed`][Self::Closed] | after close |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while listing or reading segment files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The caller-supplied configuration is unusable.
    ///
    /// Raised for a blank archive path, an unknown name encoding label, or a
    /// segment set that cannot be ordered (missing terminal `.zip`, two
    /// segments with the same number).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No file in the archive's directory matched the split-archive naming
    /// convention for the given path.
    #[error("No archive segments found for '{path}'")]
    NoSegments {
        /// The path the caller asked to open.
        path: String,
    },

    /// A segment file could not be opened.
    ///
    /// Any segments opened before this one have already been closed.
    #[error("Segment '{path}' could not be opened")]
    SegmentUnavailable {
        /// Path of the segment that failed to open.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The data is not a ZIP archive.
    #[error("Invalid ZIP format: {0}")]
    InvalidFormat(String),

    /// A ZIP header is corrupt or truncated.
    #[error("Corrupt header at offset {offset:#x}: {reason}")]
    CorruptHeader {
        /// The logical byte offset where corruption was detected.
        offset: u64,
        /// A description of the corruption.
        reason: String,
    },

    /// The archive declares more segments than were found on disk.
    #[error("Incomplete archive: expected {expected} segments, found {found}")]
    IncompleteArchive {
        /// Segment count declared by the end-of-central-directory record.
        expected: u32,
        /// Segment count found next to the requested path.
        found: u32,
    },

    /// A resource limit was exceeded while reading the central directory.
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// Two central-directory records carry the same entry name.
    #[error("Duplicate entry name in archive: {name}")]
    DuplicateEntryName {
        /// The repeated raw entry name.
        name: String,
    },

    /// Two distinct entries resolve to the same virtual path.
    ///
    /// For example `x/y` and `x//y` both canonicalize to `/x/y`.
    #[error("Entries '{existing}' and '{duplicate}' both resolve to {path}")]
    PathCollision {
        /// The shared virtual path.
        path: String,
        /// Raw name of the entry registered first.
        existing: String,
        /// Raw name of the entry that collided with it.
        duplicate: String,
    },

    /// No entry exists at the given virtual path.
    #[error("No such file: {path}")]
    NotFound {
        /// The virtual path that was looked up.
        path: String,
    },

    /// The entry exists but its data cannot be read.
    ///
    /// Raised when the local header disagrees with the central directory, or
    /// when the entry is encrypted or uses a compression method this build
    /// cannot decode.
    #[error("Access denied: {path}: {reason}")]
    AccessDenied {
        /// The virtual path of the entry.
        path: String,
        /// Why the entry is unreadable.
        reason: String,
    },

    /// A mutating filesystem operation was attempted.
    ///
    /// The archive filesystem is read-only; these calls never do any work.
    #[error("Operation not supported on a read-only archive: {operation}")]
    Unsupported {
        /// The rejected operation.
        operation: Operation,
    },

    /// The entry uses a compression method not supported by this build.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The ZIP compression method number.
        method: u16,
    },

    /// The entry uses a ZIP feature that is not supported.
    #[error("Unsupported feature: {feature}")]
    UnsupportedFeature {
        /// The name of the unsupported feature.
        feature: &'static str,
    },

    /// The CRC-32 of streamed entry data does not match the central directory.
    #[error("CRC mismatch for entry {name}: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        /// Raw name of the entry.
        name: String,
        /// The CRC recorded in the archive.
        expected: u32,
        /// The CRC of the data actually produced.
        actual: u32,
    },

    /// An entry stream produced a different number of bytes than recorded.
    #[error("Size mismatch for entry {name}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Raw name of the entry.
        name: String,
        /// The uncompressed size recorded in the archive.
        expected: u64,
        /// The number of bytes actually produced.
        actual: u64,
    },

    /// The filesystem has been closed; its handles are stale.
    #[error("Archive filesystem is closed")]
    Closed,
}

impl Error {
    /// Returns `true` for errors caused by the caller's configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::InvalidConfig(_) | Error::NoSegments { .. })
    }

    /// Returns `true` when the archive's entry names are ambiguous.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::DuplicateEntryName { .. } | Error::PathCollision { .. }
        )
    }

    /// Returns `true` for lookups of paths with no entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns `true` when an entry exists but cannot be read.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Error::AccessDenied { .. })
    }

    /// Returns `true` for rejected mutations and unsupported ZIP features.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Error::Unsupported { .. }
                | Error::UnsupportedMethod { .. }
                | Error::UnsupportedFeature { .. }
        )
    }

    /// Returns `true` if this is a data corruption error.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::CrcMismatch { .. }
                | Error::SizeMismatch { .. }
                | Error::CorruptHeader { .. }
                | Error::InvalidFormat(_)
        )
    }

    /// Returns the entry name or path associated with this error, if any.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Error::DuplicateEntryName { name } => Some(name),
            Error::PathCollision { duplicate, .. } => Some(duplicate),
            Error::NotFound { path } => Some(path),
            Error::AccessDenied { path, .. } => Some(path),
            Error::CrcMismatch { name, .. } => Some(name),
            Error::SizeMismatch { name, .. } => Some(name),
            Error::SegmentUnavailable { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Creates a CorruptHeader error.
    pub fn corrupt_header(offset: u64, reason: impl Into<String>) -> Self {
        Error::CorruptHeader {
            offset,
            reason: reason.into(),
        }
    }

    /// Recovers a crate error that travelled through a [`std::io::Read`]
    /// implementation wrapped in an [`io::Error`].
    pub(crate) fn from_stream(err: io::Error) -> Self {
        err.downcast::<Error>().unwrap_or_else(Error::Io)
    }

    /// Wraps this error so it can be returned from [`std::io::Read`].
    pub(crate) fn into_io(self) -> io::Error {
        match self {
            Error::Io(e) => e,
            Error::CrcMismatch { .. } | Error::SizeMismatch { .. } => {
                io::Error::new(io::ErrorKind::InvalidData, self)
            }
            other => io::Error::other(other),
        }
    }
}

/// A specialized Result type for archive filesystem operations.
pub type Result<T> = std::result::Result<T, Error>;
