//! N-way sync engine
//!
//! Works one directory level at a time on a list of sibling snapshots (one
//! per root, same relative path). For each tree in turn, entries the other
//! trees lack are offered through the decision provider; accepted entries
//! are copied and recorded in the destination snapshots, refused ones turn
//! into exclude or skip patterns. Files and folders go through the same
//! grouping and decisions. After each tree's offers, folders common to two
//! or more trees are synced recursively and the tree is marked fully synced.

use super::group::{extension_of, group_by_key};
use crate::decide::{DecisionProvider, Prompt, PromptKind};
use crate::executor::{CopyFailure, FailedAction, FileOps};
use crate::matcher::{escape, extension_pattern, join_relative};
use crate::types::{DirectoryIdentity, DirsyncError, PolicyBook, TreeSnapshot};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Groups larger than this are offered as one batch
pub const GROUP_THRESHOLD: usize = 10;

/// Counters for one engine run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub files_copied: usize,
    pub folders_created: usize,
    pub prompts: usize,
    pub failures: usize,
    pub levels: usize,
}

impl SyncStats {
    pub fn changed_anything(&self) -> bool {
        self.files_copied > 0 || self.folders_created > 0
    }
}

/// An entry of the source tree missing from some of the other trees
#[derive(Debug, Clone)]
struct Candidate {
    name: String,
    /// Indices (within the level) of the trees to offer it to
    missing: Vec<usize>,
}

/// Recursive N-way synchronizer
pub struct SyncEngine<'a> {
    policies: &'a mut PolicyBook,
    decider: &'a mut dyn DecisionProvider,
    ops: &'a dyn FileOps,
    errors: &'a mut Vec<CopyFailure>,
    two_root_mode: bool,
    labels: HashMap<DirectoryIdentity, usize>,
    stats: SyncStats,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        policies: &'a mut PolicyBook,
        decider: &'a mut dyn DecisionProvider,
        ops: &'a dyn FileOps,
        errors: &'a mut Vec<CopyFailure>,
    ) -> Self {
        Self {
            policies,
            decider,
            ops,
            errors,
            two_root_mode: false,
            labels: HashMap::new(),
            stats: SyncStats::default(),
        }
    }

    /// Sync the top-level snapshots of every root
    ///
    /// Root numbering in prompts follows the order of `trees`. Exactly two
    /// trees selects two-root mode.
    pub fn run(mut self, trees: &mut [TreeSnapshot]) -> Result<SyncStats, DirsyncError> {
        self.two_root_mode = trees.len() == 2;
        self.labels = trees
            .iter()
            .enumerate()
            .map(|(idx, tree)| (tree.root, idx))
            .collect();

        let mut level: Vec<&mut TreeSnapshot> = trees.iter_mut().collect();
        self.sync_level(&mut level)?;
        Ok(self.stats)
    }

    fn sync_level(&mut self, trees: &mut [&mut TreeSnapshot]) -> Result<(), DirsyncError> {
        self.stats.levels += 1;

        for source in 0..trees.len() {
            if trees[source].fully_synced {
                continue;
            }
            self.sync_entries_from(trees, source, EntryKind::File)?;
            self.sync_entries_from(trees, source, EntryKind::Folder)?;
            self.descend(trees)?;
            trees[source].fully_synced = true;
        }
        Ok(())
    }

    /// Sync every folder present in two or more trees of the level
    fn descend(&mut self, trees: &mut [&mut TreeSnapshot]) -> Result<(), DirsyncError> {
        for name in self.common_folders(trees) {
            let mut children: Vec<&mut TreeSnapshot> = trees
                .iter_mut()
                .filter(|tree| !self.policies.blocks_outgoing(&tree.root, &tree.entry_path(&name)))
                .filter_map(|tree| tree.children.get_mut(&name))
                .collect();
            if children.len() >= 2 && children.iter().any(|child| !child.fully_synced) {
                self.sync_level(&mut children)?;
            }
        }
        Ok(())
    }

    fn sync_entries_from(
        &mut self,
        trees: &mut [&mut TreeSnapshot],
        source: usize,
        kind: EntryKind,
    ) -> Result<(), DirsyncError> {
        let view: &[&mut TreeSnapshot] = trees;
        let candidates: Vec<Candidate> = kind
            .names(&view[source])
            .into_iter()
            .filter_map(|name| self.candidate(view, source, name, kind))
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }
        debug!(
            dir = %display_dir(&trees[source].relative_path),
            from = %self.label(&trees[source]),
            kind = kind.noun(),
            count = candidates.len(),
            "candidates"
        );

        let groups = group_by_key(candidates, |c| extension_of(&c.name).to_string());
        for group in groups {
            if group.items.len() > GROUP_THRESHOLD {
                self.offer_group(trees, source, kind, &group.key, group.items)?;
            } else {
                for item in group.items {
                    self.offer_item(trees, source, kind, &group.key, item)?;
                }
            }
        }
        Ok(())
    }

    fn offer_item(
        &mut self,
        trees: &mut [&mut TreeSnapshot],
        source: usize,
        kind: EntryKind,
        ext: &str,
        item: Candidate,
    ) -> Result<(), DirsyncError> {
        let path = trees[source].entry_path(&item.name);
        // an extension exclusion chosen for an earlier entry covers this one too
        if self.policies.blocks_outgoing(&trees[source].root, &path) {
            return Ok(());
        }

        let prompt = Prompt {
            kind: kind.offer_prompt(),
            text: format!(
                "Copy {} \"{}\" from {} to {}?",
                kind.noun(),
                path,
                self.label(&trees[source]),
                self.labels_of(trees, &item.missing)
            ),
            from: self.index(&trees[source]),
            to: None,
        };
        if !self.ask(&prompt) {
            return self.decline(trees, source, kind, ext, &[item.name], false);
        }

        for dest in item.missing {
            if !self.two_root_mode {
                let text = match kind {
                    EntryKind::File => {
                        format!("  Copy \"{}\" into {}?", path, self.label(&trees[dest]))
                    }
                    EntryKind::Folder => {
                        format!("  Create folder \"{}\" in {}?", path, self.label(&trees[dest]))
                    }
                };
                let prompt = Prompt {
                    kind: kind.confirm_prompt(),
                    text,
                    from: self.index(&trees[source]),
                    to: Some(self.index(&trees[dest])),
                };
                if !self.ask(&prompt) {
                    let root = trees[dest].root;
                    self.policies.skip(root, [escape(&path)])?;
                    continue;
                }
            }
            self.transfer(trees, source, dest, kind, &item.name);
        }
        Ok(())
    }

    fn offer_group(
        &mut self,
        trees: &mut [&mut TreeSnapshot],
        source: usize,
        kind: EntryKind,
        ext: &str,
        items: Vec<Candidate>,
    ) -> Result<(), DirsyncError> {
        let dir = trees[source].relative_path.clone();
        let destinations: BTreeSet<usize> =
            items.iter().flat_map(|c| c.missing.iter().copied()).collect();
        let destinations: Vec<usize> = destinations.into_iter().collect();

        let prompt = Prompt {
            kind: PromptKind::CopyGroup,
            text: format!(
                "Copy {} {} {}s in \"{}\" from {} to {}?",
                items.len(),
                describe_ext(ext),
                kind.noun(),
                display_dir(&dir),
                self.label(&trees[source]),
                self.labels_of(trees, &destinations)
            ),
            from: self.index(&trees[source]),
            to: None,
        };
        if !self.ask(&prompt) {
            let names: Vec<String> = items.into_iter().map(|c| c.name).collect();
            return self.decline(trees, source, kind, ext, &names, true);
        }

        for dest in destinations {
            let names: Vec<&str> = items
                .iter()
                .filter(|c| c.missing.contains(&dest))
                .map(|c| c.name.as_str())
                .collect();

            if !self.two_root_mode {
                let prompt = Prompt {
                    kind: PromptKind::CopyGroupInto,
                    text: format!(
                        "  Copy {} {} {}s in \"{}\" into {}?",
                        names.len(),
                        describe_ext(ext),
                        kind.noun(),
                        display_dir(&dir),
                        self.label(&trees[dest])
                    ),
                    from: self.index(&trees[source]),
                    to: Some(self.index(&trees[dest])),
                };
                if !self.ask(&prompt) {
                    let root = trees[dest].root;
                    if ext.is_empty() {
                        let exact = names.iter().map(|n| escape(&join_relative(&dir, n)));
                        self.policies.skip(root, exact)?;
                    } else {
                        self.policies.skip(root, [extension_pattern(&dir, ext)])?;
                    }
                    continue;
                }
            }

            for name in names {
                self.transfer(trees, source, dest, kind, name);
            }
        }
        Ok(())
    }

    fn transfer(
        &mut self,
        trees: &mut [&mut TreeSnapshot],
        source: usize,
        dest: usize,
        kind: EntryKind,
        name: &str,
    ) {
        match kind {
            EntryKind::File => self.copy_file(trees, source, dest, name),
            EntryKind::Folder => self.create_folder(trees, source, dest, name),
        }
    }

    fn copy_file(&mut self, trees: &mut [&mut TreeSnapshot], source: usize, dest: usize, name: &str) {
        let from = trees[source].absolute_path.join(name);
        let to = trees[dest].absolute_path.join(name);

        match self.ops.copy_file(&from, &to) {
            Ok(bytes) => {
                info!(from = %from.display(), to = %to.display(), bytes, "copied file");
                trees[dest].files.insert(name.to_string());
                self.stats.files_copied += 1;
            }
            Err(e) => {
                warn!(from = %from.display(), to = %to.display(), error = %e, "copy failed");
                self.errors
                    .push(CopyFailure::new(FailedAction::CopyFile, &from, &to, &e));
                self.stats.failures += 1;
            }
        }
    }

    /// Create an empty folder; its contents are filled in by the descent
    fn create_folder(
        &mut self,
        trees: &mut [&mut TreeSnapshot],
        source: usize,
        dest: usize,
        name: &str,
    ) {
        let to = trees[dest].absolute_path.join(name);

        match self.ops.create_dir(&to) {
            Ok(()) => {
                info!(path = %to.display(), "created folder");
                let child = trees[dest].empty_child(name);
                trees[dest].insert_child(child);
                self.stats.folders_created += 1;
            }
            Err(e) => {
                warn!(path = %to.display(), error = %e, "folder creation failed");
                let from = trees[source].absolute_path.join(name);
                self.errors
                    .push(CopyFailure::new(FailedAction::CreateFolder, &from, &to, &e));
                self.stats.failures += 1;
            }
        }
    }

    /// Build a candidate if `name` is offerable from `source` to at least one tree
    fn candidate(
        &self,
        trees: &[&mut TreeSnapshot],
        source: usize,
        name: &str,
        kind: EntryKind,
    ) -> Option<Candidate> {
        let path = trees[source].entry_path(name);
        if self.policies.blocks_outgoing(&trees[source].root, &path) {
            return None;
        }

        let missing: Vec<usize> = (0..trees.len())
            .filter(|&other| other != source)
            .filter(|&other| {
                let tree = &trees[other];
                let present = tree.has_file(name) || tree.has_folder(name);
                if present && kind.present_in(tree, name) {
                    return false;
                }
                if present {
                    debug!(path = %path, into = %self.label(tree), "name taken by an entry of another kind");
                    return false;
                }
                !self.policies.blocks_incoming(&tree.root, &path)
            })
            .collect();

        if missing.is_empty() {
            None
        } else {
            Some(Candidate {
                name: name.to_string(),
                missing,
            })
        }
    }

    /// Record a refusal from the source side
    ///
    /// Two-root mode only ever writes skip patterns for the other tree.
    /// Otherwise the source excludes the entries, by extension if the user
    /// agrees to it.
    fn decline(
        &mut self,
        trees: &[&mut TreeSnapshot],
        source: usize,
        kind: EntryKind,
        ext: &str,
        names: &[String],
        batch: bool,
    ) -> Result<(), DirsyncError> {
        let dir = trees[source].relative_path.clone();
        let exact: Vec<String> = names
            .iter()
            .map(|n| escape(&join_relative(&dir, n)))
            .collect();

        if self.two_root_mode {
            let patterns = if batch && !ext.is_empty() {
                vec![extension_pattern(&dir, ext)]
            } else {
                exact
            };
            for (idx, tree) in trees.iter().enumerate() {
                if idx != source {
                    self.policies.skip(tree.root, &patterns)?;
                }
            }
            return Ok(());
        }

        let root = trees[source].root;
        if !ext.is_empty() {
            let prompt = Prompt {
                kind: PromptKind::ExcludeExtension,
                text: format!(
                    "  Keep all {} {}s in \"{}\" only in {}, now and in future?",
                    describe_ext(ext),
                    kind.noun(),
                    display_dir(&dir),
                    self.label(&trees[source])
                ),
                from: self.index(&trees[source]),
                to: None,
            };
            if self.ask(&prompt) {
                self.policies.exclude(root, [extension_pattern(&dir, ext)])?;
                return Ok(());
            }
        }
        self.policies.exclude(root, exact)
    }

    /// Folder names present in two or more trees of the level
    fn common_folders(&self, trees: &[&mut TreeSnapshot]) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for tree in trees {
            for name in tree.folders() {
                *counts.entry(name).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count >= 2)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn ask(&mut self, prompt: &Prompt) -> bool {
        self.stats.prompts += 1;
        let answer = self.decider.decide(prompt);
        debug!(kind = ?prompt.kind, text = %prompt.text, answer, "decision");
        answer
    }

    fn index(&self, tree: &TreeSnapshot) -> usize {
        self.labels.get(&tree.root).copied().unwrap_or_default()
    }

    fn label(&self, tree: &TreeSnapshot) -> String {
        format!("#{}", self.index(tree) + 1)
    }

    fn labels_of(&self, trees: &[&mut TreeSnapshot], indices: &[usize]) -> String {
        indices
            .iter()
            .map(|&idx| self.label(&trees[idx]))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    fn noun(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Folder => "folder",
        }
    }

    fn names(self, tree: &TreeSnapshot) -> Vec<&str> {
        match self {
            EntryKind::File => tree.files.iter().map(String::as_str).collect(),
            EntryKind::Folder => tree.folders().collect(),
        }
    }

    fn offer_prompt(self) -> PromptKind {
        match self {
            EntryKind::File => PromptKind::CopyFile,
            EntryKind::Folder => PromptKind::CopyFolder,
        }
    }

    fn confirm_prompt(self) -> PromptKind {
        match self {
            EntryKind::File => PromptKind::CopyFileInto,
            EntryKind::Folder => PromptKind::CopyFolderInto,
        }
    }

    fn present_in(self, tree: &TreeSnapshot, name: &str) -> bool {
        match self {
            EntryKind::File => tree.has_file(name),
            EntryKind::Folder => tree.has_folder(name),
        }
    }
}

fn display_dir(dir: &str) -> &str {
    if dir.is_empty() {
        "."
    } else {
        dir
    }
}

fn describe_ext(ext: &str) -> String {
    if ext.is_empty() {
        "extension-less".to_string()
    } else {
        format!("\"{}\"", ext)
    }
}

/// Convenience wrapper: build an engine and run it over `trees`
pub fn sync_trees(
    trees: &mut [TreeSnapshot],
    policies: &mut PolicyBook,
    decider: &mut dyn DecisionProvider,
    ops: &dyn FileOps,
    errors: &mut Vec<CopyFailure>,
) -> Result<SyncStats, DirsyncError> {
    SyncEngine::new(policies, decider, ops, errors).run(trees)
}
