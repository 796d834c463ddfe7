//! Exit codes for the CLI tool.

use zipvfs::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive format error
pub const BAD_ARCHIVE: i32 = 3;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Path not found in the archive
pub const NOT_FOUND: i32 = 6;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    BadArchive,
    IoError,
    NotFound,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::IoError => IO_ERROR,
            Self::NotFound => NOT_FOUND,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a zipvfs error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) | Error::SegmentUnavailable { .. } => ExitCode::IoError,
        Error::InvalidConfig(_) | Error::NoSegments { .. } => ExitCode::BadArgs,
        Error::InvalidFormat(_) | Error::CorruptHeader { .. } => ExitCode::BadArchive,
        Error::IncompleteArchive { .. } => ExitCode::BadArchive,
        Error::DuplicateEntryName { .. } | Error::PathCollision { .. } => ExitCode::BadArchive,
        Error::CrcMismatch { .. } | Error::SizeMismatch { .. } => ExitCode::BadArchive,
        Error::AccessDenied { .. } => ExitCode::BadArchive,
        Error::UnsupportedMethod { .. } | Error::UnsupportedFeature { .. } => {
            ExitCode::BadArchive
        }
        Error::NotFound { .. } => ExitCode::NotFound,
        Error::ResourceLimitExceeded(_) => ExitCode::FatalError,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
