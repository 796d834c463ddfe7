//! Fuzz target for VirtualPath canonicalization.
//!
//! Run with: cargo +nightly fuzz run virtual_path
//!
//! Properties checked:
//! - canonical form has no empty, `.` or `..` segments
//! - canonicalization is idempotent
//! - a path is always a child of its parent

#![no_main]

use libfuzzer_sys::fuzz_target;
use zipvfs::VirtualPath;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let path = VirtualPath::new(raw);
    let text = path.as_str();

    assert!(!text.starts_with('/'), "leading separator: {:?}", text);
    assert!(!text.ends_with('/'), "trailing separator: {:?}", text);
    assert!(
        path.segments().all(|s| !s.is_empty() && s != "." && s != ".."),
        "non-canonical segment in {:?}",
        text
    );
    assert_eq!(VirtualPath::new(text), path);

    if let Some(parent) = path.parent() {
        assert!(path.starts_with(&parent));
        assert_eq!(path.strip_prefix(&parent).map(|p| p.depth()), Some(1));
    }
});
