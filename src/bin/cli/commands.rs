//! Command implementations for the CLI tool.

use std::io::{self, Write};
use std::path::Path;

use zipvfs::{Error, OpenOptions, VirtualPath, ZipFileSystem};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{Listed, SegmentRow, create_formatter};

/// Builds open options from the global flags.
pub fn open_options(encoding: Option<&str>, verify: bool) -> Result<OpenOptions, ExitCode> {
    let options = OpenOptions::new().verify_crc(verify);
    match encoding {
        Some(label) => options.encoding(label).map_err(|e| report(&e)),
        None => Ok(options),
    }
}

fn report(error: &Error) -> ExitCode {
    eprintln!("Error: {}", error);
    error_to_exit_code(error)
}

fn open_archive(path: &Path, options: &OpenOptions) -> Result<ZipFileSystem, ExitCode> {
    ZipFileSystem::open_with_options(path, options).map_err(|e| report(&e))
}

fn listed(fs: &ZipFileSystem, path: &VirtualPath) -> zipvfs::Result<Listed> {
    let attrs = fs.attributes(path)?;
    Ok(Listed {
        path: path.as_str().to_string(),
        is_dir: attrs.is_directory,
        size: attrs.size,
        modified: attrs.modified,
    })
}

fn collect(fs: &ZipFileSystem, paths: &[VirtualPath]) -> Result<Vec<Listed>, ExitCode> {
    let mut rows = Vec::with_capacity(paths.len());
    for path in paths {
        match listed(fs, path) {
            Ok(row) => rows.push(row),
            // Unreadable entries are still listed, without attributes.
            Err(Error::AccessDenied { .. }) => {
                let node = fs.resolve(path).map_err(|e| report(&e))?;
                rows.push(Listed {
                    path: path.as_str().to_string(),
                    is_dir: node.is_dir(),
                    size: node.entry().map_or(0, |e| e.size()),
                    modified: std::time::UNIX_EPOCH,
                });
            }
            Err(e) => return Err(report(&e)),
        }
    }
    Ok(rows)
}

fn print(text: &str) -> ExitCode {
    let mut stdout = io::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
        Ok(()) => ExitCode::Success,
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::Success,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::IoError
        }
    }
}

/// Ensures `path` is a directory before listing it.
fn require_dir(fs: &ZipFileSystem, path: &VirtualPath) -> Result<(), ExitCode> {
    match fs.resolve(path) {
        Ok(node) if node.is_dir() => Ok(()),
        Ok(_) => {
            eprintln!("Error: {} is not a directory", path);
            Err(ExitCode::BadArgs)
        }
        Err(e) => Err(report(&e)),
    }
}

/// Ls command implementation
pub fn ls(
    archive: &Path,
    path: &str,
    long: bool,
    options: &OpenOptions,
    format: OutputFormat,
) -> ExitCode {
    let fs = match open_archive(archive, options) {
        Ok(fs) => fs,
        Err(code) => return code,
    };
    let path = VirtualPath::new(path);
    if let Err(code) = require_dir(&fs, &path) {
        return code;
    }

    let children = match fs.children(&path) {
        Ok(children) => children,
        Err(e) => return report(&e),
    };
    match collect(&fs, children) {
        Ok(rows) => print(&create_formatter(format).format_listing(&rows, long)),
        Err(code) => code,
    }
}

/// Tree command implementation
pub fn tree(archive: &Path, path: &str, options: &OpenOptions, format: OutputFormat) -> ExitCode {
    let fs = match open_archive(archive, options) {
        Ok(fs) => fs,
        Err(code) => return code,
    };
    let path = VirtualPath::new(path);
    if let Err(code) = require_dir(&fs, &path) {
        return code;
    }

    let descendants = match fs.walk(&path) {
        Ok(list) => list,
        Err(e) => return report(&e),
    };
    match collect(&fs, &descendants) {
        Ok(rows) => print(&create_formatter(format).format_tree(path.as_str(), &rows)),
        Err(code) => code,
    }
}

/// Stat command implementation
pub fn stat(archive: &Path, path: &str, options: &OpenOptions, format: OutputFormat) -> ExitCode {
    let fs = match open_archive(archive, options) {
        Ok(fs) => fs,
        Err(code) => return code,
    };
    let path = VirtualPath::new(path);
    match fs.attributes(&path) {
        Ok(attrs) => print(&create_formatter(format).format_attributes(path.as_str(), &attrs)),
        Err(e) => report(&e),
    }
}

/// Cat command implementation
pub fn cat(archive: &Path, path: &str, options: &OpenOptions) -> ExitCode {
    let fs = match open_archive(archive, options) {
        Ok(fs) => fs,
        Err(code) => return code,
    };
    let mut stream = match fs.open_read(path) {
        Ok(stream) => stream,
        Err(e) => return report(&e),
    };

    let mut stdout = io::stdout().lock();
    match io::copy(&mut stream, &mut stdout).and_then(|_| stdout.flush()) {
        Ok(()) => ExitCode::Success,
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::Success,
        Err(e) => report(&e.downcast::<Error>().unwrap_or_else(Error::Io)),
    }
}

/// Segments command implementation
pub fn segments(archive: &Path, options: &OpenOptions, format: OutputFormat) -> ExitCode {
    let fs = match open_archive(archive, options) {
        Ok(fs) => fs,
        Err(code) => return code,
    };
    let rows: Vec<SegmentRow> = fs
        .segments()
        .iter()
        .map(|segment| SegmentRow {
            path: segment.path().to_path_buf(),
            len: segment.len(),
        })
        .collect();
    print(&create_formatter(format).format_segments(&rows))
}
