//! Read-only N-way comparison of sibling snapshots

use super::report::{DiffReport, EntryDiff, EntryKind, LevelDiff};
use crate::types::TreeSnapshot;
use std::collections::BTreeMap;
use tracing::debug;

/// Compare root snapshots by entry presence
///
/// Only names and kinds are compared. A name that is a file in one root
/// and a folder in another is reported once per kind.
pub fn analyse(trees: &[TreeSnapshot]) -> DiffReport {
    let mut report = DiffReport {
        roots: trees.iter().map(|t| t.absolute_path.clone()).collect(),
        root_names_differ: trees.windows(2).any(|w| w[0].name != w[1].name),
        levels: Vec::new(),
    };

    let indexed: Vec<(usize, &TreeSnapshot)> = trees.iter().enumerate().collect();
    compare_level(&indexed, &mut report.levels);
    report
}

fn compare_level(trees: &[(usize, &TreeSnapshot)], out: &mut Vec<LevelDiff>) {
    let Some((_, first)) = trees.first() else {
        return;
    };
    let path = first.relative_path.clone();

    let mut files: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut folders: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, tree) in trees {
        for name in &tree.files {
            files.entry(name.as_str()).or_default().push(*idx);
        }
        for name in tree.folders() {
            folders.entry(name).or_default().push(*idx);
        }
    }

    let participants: Vec<usize> = trees.iter().map(|(idx, _)| *idx).collect();
    let mut entries = Vec::new();
    for (kind, names) in [(EntryKind::File, &files), (EntryKind::Folder, &folders)] {
        for (name, present_in) in names {
            if present_in.len() == participants.len() {
                continue;
            }
            let missing_from = participants
                .iter()
                .copied()
                .filter(|idx| !present_in.contains(idx))
                .collect();
            entries.push(EntryDiff {
                name: name.to_string(),
                kind,
                present_in: present_in.clone(),
                missing_from,
            });
        }
    }

    if !entries.is_empty() {
        debug!(path = %path, entries = entries.len(), "level differs");
        out.push(LevelDiff { path, entries });
    }

    for (name, present_in) in &folders {
        if present_in.len() < 2 {
            continue;
        }
        let children: Vec<(usize, &TreeSnapshot)> = trees
            .iter()
            .filter_map(|(idx, tree)| tree.child(name).map(|child| (*idx, child)))
            .collect();
        compare_level(&children, out);
    }
}
