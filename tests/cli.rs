//! CLI command integration tests.
//!
//! These tests verify the core functionality that CLI commands would use.
//! Tests use library functions directly rather than subprocess execution.

use std::io::Read;
use std::path::PathBuf;
use tempfile::TempDir;
use zipvfs::{Error, OpenOptions, VirtualPath, ZipFileSystem};

mod common;

use common::ZipBuilder;

/// Creates a test archive file on disk.
fn create_test_archive_file(entries: &[(&str, &[u8])]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let builder = entries
        .iter()
        .fold(ZipBuilder::new(), |b, (name, data)| b.file(name, data));
    let archive_path = builder.write_to(temp_dir.path(), "test");
    (temp_dir, archive_path)
}

// =============================================================================
// Ls Command Tests
// =============================================================================

#[test]
fn test_ls_root() {
    let (_temp, path) = create_test_archive_file(&[
        ("file1.txt", b"content1"),
        ("file2.txt", b"content2"),
        ("subdir/file3.txt", b"content3"),
    ]);

    let fs = ZipFileSystem::open(&path).expect("Failed to open archive");
    let names: Vec<&str> = fs
        .read_dir("/")
        .unwrap()
        .map(|e| e.file_name())
        .collect();
    assert_eq!(names, ["file1.txt", "file2.txt", "subdir"]);

    // subdir has no entry of its own; it is listed as a directory.
    assert!(fs.resolve("subdir").unwrap().is_dir());
    assert!(fs.exists("subdir/file3.txt").unwrap());
}

#[test]
fn test_ls_long_sizes() {
    let (_temp, path) = create_test_archive_file(&[("a.txt", b"hello"), ("b.txt", b"world!")]);

    let fs = ZipFileSystem::open(&path).expect("Failed to open archive");
    let total: u64 = fs.read_dir("/").unwrap().map(|e| e.size()).sum();
    assert_eq!(total, 11);
}

#[test]
fn test_ls_file_is_not_a_directory() {
    let (_temp, path) = create_test_archive_file(&[("a.txt", b"hello")]);

    let fs = ZipFileSystem::open(&path).expect("Failed to open archive");
    assert!(!fs.resolve("a.txt").unwrap().is_dir());
    assert!(fs.children("a.txt").unwrap().is_empty());
}

#[test]
fn test_ls_nonexistent_archive() {
    let result = ZipFileSystem::open("/nonexistent/path/archive.zip");
    assert!(result.is_err());
}

// =============================================================================
// Tree Command Tests
// =============================================================================

#[test]
fn test_tree_lists_descendants() {
    let temp = TempDir::new().unwrap();
    let path = ZipBuilder::new()
        .dir("docs/")
        .dir("docs/api/")
        .file("docs/api/index.html", b"<html/>")
        .file("docs/readme.md", b"# docs")
        .file("LICENSE", b"MIT")
        .write_to(temp.path(), "tree");

    let fs = ZipFileSystem::open(&path).unwrap();
    let all: Vec<String> = fs.walk("/").unwrap().iter().map(|p| p.to_string()).collect();
    assert_eq!(
        all,
        [
            "/docs",
            "/docs/api",
            "/docs/api/index.html",
            "/docs/readme.md",
            "/LICENSE"
        ]
    );

    let docs: Vec<VirtualPath> = fs.walk("docs").unwrap();
    assert_eq!(docs.len(), 3);
}

// =============================================================================
// Stat Command Tests
// =============================================================================

#[test]
fn test_stat_file() {
    let (_temp, path) = create_test_archive_file(&[("data.bin", &[7u8; 300])]);

    let fs = ZipFileSystem::open(&path).unwrap();
    let attrs = fs.attributes("data.bin").unwrap();
    assert!(attrs.is_regular_file);
    assert_eq!(attrs.size, 300);
    assert_eq!(attrs.method.map(|m| m.to_string()), Some("Stored".to_string()));
}

#[test]
fn test_stat_not_found() {
    let (_temp, path) = create_test_archive_file(&[("data.bin", b"x")]);

    let fs = ZipFileSystem::open(&path).unwrap();
    let err = fs.attributes("missing").unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(err.to_string(), "No such file: /missing");
}

// =============================================================================
// Cat Command Tests
// =============================================================================

#[test]
fn test_cat_streams_content() {
    let (_temp, path) = create_test_archive_file(&[("notes.txt", b"line one\nline two\n")]);

    let fs = ZipFileSystem::open(&path).unwrap();
    let mut out = Vec::new();
    std::io::copy(&mut fs.open_read("notes.txt").unwrap(), &mut out).unwrap();
    assert_eq!(out, b"line one\nline two\n");
}

#[test]
fn test_cat_without_verification() {
    let mut spec = common::EntrySpec::stored("bad.txt", b"payload");
    spec.crc32 ^= 1;
    let temp = TempDir::new().unwrap();
    let path = ZipBuilder::new().entry(spec).write_to(temp.path(), "bad");

    let verified = ZipFileSystem::open(&path).unwrap();
    let mut sink = Vec::new();
    let err = verified
        .open_read("bad.txt")
        .unwrap()
        .read_to_end(&mut sink)
        .unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

    let options = OpenOptions::new().verify_crc(false);
    let unverified = ZipFileSystem::open_with_options(&path, &options).unwrap();
    assert_eq!(unverified.read_to_vec("bad.txt").unwrap(), b"payload");
}

// =============================================================================
// Segments Command Tests
// =============================================================================

#[test]
fn test_segments_listing() {
    let temp = TempDir::new().unwrap();
    let written = ZipBuilder::new()
        .file("part.bin", &[1u8; 500])
        .write_split(temp.path(), "vol", &[200, 400]);

    let fs = ZipFileSystem::open(&written[0]).unwrap();
    let lens: Vec<u64> = fs.segments().iter().map(|s| s.len()).collect();
    assert_eq!(lens.len(), 3);
    assert_eq!(lens[0], 200);
    assert_eq!(lens[1], 200);
    assert_eq!(lens.iter().sum::<u64>(), fs.total_len());
}

#[test]
fn test_encoding_option_labels() {
    assert!(OpenOptions::new().encoding("ibm866").is_ok());
    assert!(OpenOptions::new().encoding(" windows-1252 ").is_ok());
    assert!(OpenOptions::new().encoding("shift_jis").is_ok());
    assert!(matches!(
        OpenOptions::new().encoding("klingon"),
        Err(Error::InvalidConfig(_))
    ));
}
