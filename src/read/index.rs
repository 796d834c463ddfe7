//! The entry ↔ path index of an archive.
//!
//! The index is built in a single pass over the central directory and never
//! changes afterwards. It holds:
//! - raw entry name → virtual path
//! - virtual path → entry
//! - directory path → children, in archive order
//!
//! Some archive tools omit the directory entries above their content, e.g.
//! an archive holding only `proj/a/file.txt` and `proj/a/b/file2.txt`. The
//! index manufactures synthetic directory entries for the ancestor chain
//! shared by every entry (`proj/`, `proj/a/`) and peels all but the last
//! level of that chain off every path, so the example above is presented as
//! `a/file.txt` and `a/b/file2.txt`.
//!
//! Directories further down that have no entry of their own (`a/b` above)
//! get an implied synthetic entry the first time an entry below them is
//! registered, so every indexed path is reachable from the root. A stored
//! entry for the same path later in the archive takes the implied entry's
//! place.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::entry::IndexedEntry;
use crate::format::RawEntry;
use crate::{Error, Result, VirtualPath};

/// Immutable lookup tables for one archive.
#[derive(Debug, Clone, Default)]
pub struct ArchiveIndex {
    /// Registered entries, in registration order.
    entries: Vec<(VirtualPath, IndexedEntry)>,
    path_by_name: BTreeMap<String, VirtualPath>,
    slot_by_path: BTreeMap<VirtualPath, usize>,
    children: BTreeMap<VirtualPath, Vec<VirtualPath>>,
    top_entries: Vec<IndexedEntry>,
    /// Paths whose entry is implied by entries below them.
    implied: BTreeSet<VirtualPath>,
    peeled: VirtualPath,
}

impl ArchiveIndex {
    /// Builds the index from central directory entries in physical order.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateEntryName`] if two entries share a raw name
    /// - [`Error::PathCollision`] if two entries canonicalize to the same path
    pub fn build(raw_entries: Vec<RawEntry>) -> Result<Self> {
        let chain = implied_chain(&raw_entries);
        let peeled = VirtualPath::from_segments(
            chain.iter().take(chain.len().saturating_sub(1)).map(String::as_str),
        );

        let synthetic: Vec<IndexedEntry> = (1..=chain.len())
            .map(|depth| IndexedEntry::Synthetic {
                name: format!("{}/", chain[..depth].join("/")),
            })
            .collect();
        if !synthetic.is_empty() {
            log::debug!(
                "Synthesizing {} top-level director{} ({}), peeling '{}'",
                synthetic.len(),
                if synthetic.len() == 1 { "y" } else { "ies" },
                chain.join("/"),
                peeled
            );
        }

        let mut index = Self {
            peeled,
            top_entries: synthetic.clone(),
            ..Self::default()
        };
        let mut seen = HashSet::new();
        let entries = synthetic
            .into_iter()
            .chain(raw_entries.into_iter().map(IndexedEntry::Stored));
        for entry in entries {
            index.register(entry, &mut seen)?;
        }

        log::debug!(
            "Indexed {} entries ({} synthetic, {} implied)",
            index.entries.len(),
            index.top_entries.len(),
            index.implied.len()
        );
        Ok(index)
    }

    fn register(&mut self, entry: IndexedEntry, seen: &mut HashSet<String>) -> Result<()> {
        let name = entry.name().to_string();
        if !seen.insert(name.clone()) {
            return Err(Error::DuplicateEntryName { name });
        }

        let canonical = VirtualPath::new(&name);
        let path = canonical.strip_prefix(&self.peeled).unwrap_or(canonical);

        if path.is_root() {
            if !entry.is_synthetic() {
                log::warn!("Skipping entry '{}': it names the archive root", name);
            }
            return Ok(());
        }

        if let Some(&slot) = self.slot_by_path.get(&path) {
            if self.implied.remove(&path) {
                log::trace!("Entry '{}' replaces implied directory {}", name, path);
                let implied_name = self.entries[slot].1.name().to_string();
                self.path_by_name.remove(&implied_name);
                self.path_by_name.insert(name, path);
                self.entries[slot].1 = entry;
                return Ok(());
            }
            return Err(Error::PathCollision {
                path: path.to_string(),
                existing: self.entries[slot].1.name().to_string(),
                duplicate: name,
            });
        }

        self.imply_ancestors(&path);
        log::trace!("Registering '{}' at {}", name, path);
        self.insert(path, name, entry);
        Ok(())
    }

    /// Registers implied directories for every missing ancestor of `path`,
    /// outermost first.
    fn imply_ancestors(&mut self, path: &VirtualPath) {
        let mut missing = Vec::new();
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.is_root() || self.slot_by_path.contains_key(&dir) {
                break;
            }
            current = dir.parent();
            missing.push(dir);
        }

        for dir in missing.into_iter().rev() {
            let name = if self.peeled.is_root() {
                format!("{}/", dir.as_str())
            } else {
                format!("{}/{}/", self.peeled.as_str(), dir.as_str())
            };
            log::trace!("Implying directory '{}' at {}", name, dir);
            self.implied.insert(dir.clone());
            self.insert(dir, name.clone(), IndexedEntry::Synthetic { name });
        }
    }

    fn insert(&mut self, path: VirtualPath, name: String, entry: IndexedEntry) {
        let parent = path.parent().unwrap_or_default();
        self.children.entry(parent).or_default().push(path.clone());
        self.slot_by_path.insert(path.clone(), self.entries.len());
        self.path_by_name.insert(name, path.clone());
        self.entries.push((path, entry));
    }

    /// Looks up the entry at `path`. The root has no entry.
    pub fn get(&self, path: &VirtualPath) -> Option<&IndexedEntry> {
        self.slot_by_path
            .get(path)
            .map(|&slot| &self.entries[slot].1)
    }

    /// Returns the virtual path of the entry with the given raw name.
    pub fn path_of(&self, name: &str) -> Option<&VirtualPath> {
        self.path_by_name.get(name)
    }

    /// Returns the direct children of `path`, in archive order.
    ///
    /// Paths without children, including files and unknown paths, yield an
    /// empty slice.
    pub fn children(&self, path: &VirtualPath) -> &[VirtualPath] {
        self.children
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the synthetic directory chain, root to leaf.
    pub fn top_entries(&self) -> &[IndexedEntry] {
        &self.top_entries
    }

    /// Returns the prefix removed from every raw path.
    pub fn peeled(&self) -> &VirtualPath {
        &self.peeled
    }

    /// Returns the number of implied directories.
    pub fn implied_len(&self) -> usize {
        self.implied.len()
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entry is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over registered entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&VirtualPath, &IndexedEntry)> {
        self.entries.iter().map(|(path, entry)| (path, entry))
    }
}

/// Returns the ancestor chain shared by every entry.
///
/// This is the longest common prefix of the parent chains of all entries
/// that name something below the root.
fn implied_chain(entries: &[RawEntry]) -> Vec<String> {
    let mut chain: Option<Vec<String>> = None;
    for entry in entries {
        let canonical = VirtualPath::new(&entry.name);
        let segments: Vec<&str> = canonical.segments().collect();
        let Some((_, parents)) = segments.split_last() else {
            continue;
        };
        chain = Some(match chain.take() {
            None => parents.iter().map(|s| s.to_string()).collect(),
            Some(mut common) => {
                let shared = common
                    .iter()
                    .zip(parents)
                    .take_while(|(a, b)| a.as_str() == **b)
                    .count();
                common.truncate(shared);
                common
            }
        });
        if chain.as_ref().is_some_and(Vec::is_empty) {
            break;
        }
    }
    chain.unwrap_or_default()
}
