//! TreeSnapshot - One directory level as seen by one root

use super::DirectoryIdentity;
use crate::matcher::join_relative;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Filtered view of one directory of one root during one run
///
/// Sub-folders are kept in a name-keyed map, so folder names and child
/// snapshots can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSnapshot {
    /// Base name of the directory
    pub name: String,

    /// Identity of the root this snapshot belongs to
    pub root: DirectoryIdentity,

    /// Absolute filesystem path of this directory
    pub absolute_path: PathBuf,

    /// Path relative to the root, `/`-separated, empty at the top level
    pub relative_path: String,

    /// File base-names present after exclusion filtering
    pub files: BTreeSet<String>,

    /// Folder name → child snapshot
    pub children: BTreeMap<String, TreeSnapshot>,

    /// Set once the sync engine has processed this snapshot
    pub fully_synced: bool,
}

impl TreeSnapshot {
    /// Create an empty snapshot
    pub fn new(
        name: impl Into<String>,
        root: DirectoryIdentity,
        absolute_path: PathBuf,
        relative_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            root,
            absolute_path,
            relative_path: relative_path.into(),
            files: BTreeSet::new(),
            children: BTreeMap::new(),
            fully_synced: false,
        }
    }

    /// Create an empty child snapshot for folder `name` of this directory
    pub fn empty_child(&self, name: &str) -> Self {
        Self::new(
            name,
            self.root,
            self.absolute_path.join(name),
            self.entry_path(name),
        )
    }

    /// Insert a child, replacing any previous child with the same name
    pub fn insert_child(&mut self, child: TreeSnapshot) {
        self.children.insert(child.name.clone(), child);
    }

    pub fn child(&self, name: &str) -> Option<&TreeSnapshot> {
        self.children.get(name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut TreeSnapshot> {
        self.children.get_mut(name)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.files.contains(name)
    }

    pub fn has_folder(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Folder names, sorted
    pub fn folders(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Root-relative path of an entry directly inside this directory
    pub fn entry_path(&self, name: &str) -> String {
        join_relative(&self.relative_path, name)
    }

    /// Number of files in this snapshot and all descendants
    pub fn total_files(&self) -> usize {
        self.files.len() + self.children.values().map(TreeSnapshot::total_files).sum::<usize>()
    }

    /// Number of folders below this snapshot
    pub fn total_folders(&self) -> usize {
        self.children.len()
            + self
                .children
                .values()
                .map(TreeSnapshot::total_folders)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.children.is_empty()
    }
}
