//! Recursive snapshot builder

use crate::matcher::{join_relative, PatternSet};
use crate::executor::{ERROR_REPORT_FILE_NAME, PART_SUFFIX};
use crate::store::{CONFIG_FILE_NAME, CONFIG_TMP_FILE_NAME};
use crate::types::{DirectoryIdentity, DirsyncError, TreeSnapshot};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// Platform metadata files that are never compared or copied
const SYSTEM_FILES: &[&str] = &["desktop.ini", ".DS_Store", "Thumbs.db"];

/// Platform metadata folders that are never compared or copied
const SYSTEM_FOLDERS: &[&str] = &[
    "System Volume Information",
    "$RECYCLE.BIN",
    ".Trashes",
    ".Spotlight-V100",
    ".fseventsd",
];

/// Callback for reporting scan progress
///
/// Arguments:
/// - `folders_scanned`: Total number of folders listed so far
/// - `files_seen`: Total number of files kept so far
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Check whether `name` is a system entry or one of dirsync's own files
pub fn is_system_entry(name: &str) -> bool {
    name == CONFIG_FILE_NAME
        || name == ERROR_REPORT_FILE_NAME
        || name == CONFIG_TMP_FILE_NAME
        || name.ends_with(PART_SUFFIX)
        || SYSTEM_FILES.contains(&name)
        || SYSTEM_FOLDERS.contains(&name)
}

/// A snapshot plus the exclude patterns that filtered at least one entry
#[derive(Debug, Clone)]
pub struct BuiltTree {
    pub snapshot: TreeSnapshot,
    pub used_patterns: HashSet<String>,
}

/// Builds filtered [`TreeSnapshot`]s from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotBuilder {
    max_depth: Option<usize>,
}

struct WalkState<'a> {
    used: &'a mut HashSet<String>,
    folders: u64,
    files: u64,
    on_progress: Option<&'a ProgressCallback>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit recursion; `Some(0)` lists only the top level
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the snapshot of a whole root
    ///
    /// # Errors
    /// Any directory that cannot be listed aborts the build.
    pub fn build_root(
        &self,
        root_dir: &Path,
        root: DirectoryIdentity,
        exclude: &PatternSet,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<BuiltTree, DirsyncError> {
        let start = Instant::now();
        let mut used_patterns = HashSet::new();
        let mut state = WalkState {
            used: &mut used_patterns,
            folders: 0,
            files: 0,
            on_progress,
        };
        let mut snapshot = self.walk(root_dir, "", root, exclude, 0, &mut state)?;
        snapshot.name = root_name(root_dir);

        debug!(
            root = %root_dir.display(),
            folders = state.folders,
            files = state.files,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "snapshot built"
        );
        Ok(BuiltTree {
            snapshot,
            used_patterns,
        })
    }

    /// Build the snapshot of `root_dir/relative_path`
    ///
    /// Every exclude pattern that matched a real entry is added to `used`.
    pub fn build(
        &self,
        root_dir: &Path,
        relative_path: &str,
        root: DirectoryIdentity,
        exclude: &PatternSet,
        used: &mut HashSet<String>,
    ) -> Result<TreeSnapshot, DirsyncError> {
        let mut state = WalkState {
            used,
            folders: 0,
            files: 0,
            on_progress: None,
        };
        self.walk(root_dir, relative_path, root, exclude, 0, &mut state)
    }

    fn walk(
        &self,
        root_dir: &Path,
        relative_path: &str,
        root: DirectoryIdentity,
        exclude: &PatternSet,
        depth: usize,
        state: &mut WalkState<'_>,
    ) -> Result<TreeSnapshot, DirsyncError> {
        let absolute_path = if relative_path.is_empty() {
            root_dir.to_path_buf()
        } else {
            root_dir.join(relative_path)
        };
        let name = relative_path.rsplit('/').next().unwrap_or_default();
        let mut snapshot = TreeSnapshot::new(name, root, absolute_path.clone(), relative_path);

        let mut folders = Vec::new();
        for (entry_name, is_dir) in list_dir(&absolute_path)? {
            if is_system_entry(&entry_name) {
                continue;
            }

            let entry_path = join_relative(relative_path, &entry_name);
            let hits = exclude.matching(&entry_path);
            if !hits.is_empty() {
                state.used.extend(hits.into_iter().map(str::to_string));
                continue;
            }

            if is_dir {
                folders.push(entry_name);
            } else {
                snapshot.files.insert(entry_name);
                state.files += 1;
            }
        }

        state.folders += 1;
        if let Some(callback) = state.on_progress {
            callback(state.folders, state.files);
        }

        let descend = self.max_depth.map_or(true, |max| depth <= max);
        for folder in folders {
            let child = if descend {
                let child_path = join_relative(relative_path, &folder);
                self.walk(root_dir, &child_path, root, exclude, depth + 1, state)?
            } else {
                snapshot.empty_child(&folder)
            };
            snapshot.insert_child(child);
        }

        Ok(snapshot)
    }
}

/// Immediate children of `dir` as `(name, is_dir)`, sorted by name
///
/// Symlinks are reported as files and never followed.
fn list_dir(dir: &Path) -> Result<Vec<(String, bool)>, DirsyncError> {
    let walker = ignore::WalkBuilder::new(dir)
        .standard_filters(false) // every entry counts, hidden and ignored ones too
        .max_depth(Some(1))
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut entries = Vec::new();
    for result in walker {
        let entry = result?;
        if entry.depth() == 0 {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            warn!(
                path = %entry.path().display(),
                "skipping entry whose name is not valid UTF-8"
            );
            continue;
        };
        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        entries.push((name.to_string(), is_dir));
    }
    Ok(entries)
}

fn root_name(root_dir: &Path) -> String {
    root_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root_dir.display().to_string())
}
