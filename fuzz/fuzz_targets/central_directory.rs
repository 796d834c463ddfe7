//! Fuzz target for central directory parsing and index construction.
//!
//! Feeds arbitrary bytes through the same path `ZipFileSystem::open` takes
//! after the segments are assembled: EOCD search, central directory parsing,
//! local header validation and index building.
//!
//! Run with: cargo +nightly fuzz run central_directory

#![no_main]

use libfuzzer_sys::fuzz_target;
use zipvfs::format::ZipReader;
use zipvfs::read::ArchiveIndex;

fuzz_target!(|data: &[u8]| {
    let reader = ZipReader::new(data.to_vec()).with_max_entries(4096);
    let Ok(entries) = reader.entries() else {
        return;
    };

    // Local headers are validated lazily; exercise them too.
    for entry in &entries {
        if let Ok(offset) = reader.data_offset(entry) {
            assert!(offset + entry.compressed_size <= data.len() as u64);
        }
    }

    let Ok(index) = ArchiveIndex::build(entries) else {
        return;
    };

    for (path, entry) in index.iter() {
        assert_eq!(index.get(path).map(|e| e.name()), Some(entry.name()));
        assert_eq!(index.path_of(entry.name()), Some(path));
        let parent = path.parent().expect("indexed paths are never the root");
        assert!(index.children(&parent).contains(path));
    }
});
