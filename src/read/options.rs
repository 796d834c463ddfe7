//! Options for opening an archive filesystem.

use encoding_rs::Encoding;

use crate::format::parser::DEFAULT_MAX_ENTRIES;
use crate::{Error, Result};

/// Options controlling how an archive is opened and read.
///
/// # Example
///
/// ```rust,no_run
/// use zipvfs::{OpenOptions, ZipFileSystem};
///
/// let options = OpenOptions::new()
///     .encoding("sjis")?
///     .max_entries(10_000);
/// let fs = ZipFileSystem::open_with_options("backup.zip", &options)?;
/// # Ok::<(), zipvfs::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct OpenOptions {
    encoding: Option<&'static Encoding>,
    verify_crc: bool,
    max_entries: usize,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            encoding: None,
            verify_crc: true,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl OpenOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the encoding of entry names stored without the UTF-8 flag.
    ///
    /// `label` is any WHATWG encoding label, e.g. `"sjis"`, `"shift_jis"`
    /// or `"windows-1252"`. Without an override such names are read as UTF-8
    /// when they are valid UTF-8 and as IBM code page 437 otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the label is unknown.
    pub fn encoding(self, label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| Error::InvalidConfig(format!("unknown encoding label '{label}'")))?;
        Ok(self.with_encoding(encoding))
    }

    /// Sets the name encoding directly.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Enables or disables CRC-32 and size checks at the end of entry streams.
    pub fn verify_crc(mut self, verify: bool) -> Self {
        self.verify_crc = verify;
        self
    }

    /// Sets the maximum number of central directory entries.
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Returns the configured name encoding.
    pub fn name_encoding(&self) -> Option<&'static Encoding> {
        self.encoding
    }

    /// Returns whether entry streams are verified.
    pub fn verifies_crc(&self) -> bool {
        self.verify_crc
    }

    /// Returns the entry limit.
    pub fn entry_limit(&self) -> usize {
        self.max_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = OpenOptions::default();
        assert!(options.name_encoding().is_none());
        assert!(options.verifies_crc());
        assert_eq!(options.entry_limit(), 1_000_000);
    }

    #[test]
    fn test_encoding_label() {
        let options = OpenOptions::new().encoding("sjis").unwrap();
        assert_eq!(options.name_encoding(), Some(encoding_rs::SHIFT_JIS));

        let options = OpenOptions::new().encoding(" Windows-1252 ").unwrap();
        assert_eq!(options.name_encoding(), Some(encoding_rs::WINDOWS_1252));
    }

    #[test]
    fn test_unknown_encoding() {
        let err = OpenOptions::new().encoding("klingon").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_builder_chain() {
        let options = OpenOptions::new().verify_crc(false).max_entries(5);
        assert!(!options.verifies_crc());
        assert_eq!(options.entry_limit(), 5);
    }
}
