//! Difference report types

use crate::sync::group::{extension_of, group_by_key};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether an entry is a file or a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// One entry that is not present in every compared root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDiff {
    pub name: String,
    pub kind: EntryKind,
    /// Root indices holding the entry
    pub present_in: Vec<usize>,
    /// Root indices lacking it
    pub missing_from: Vec<usize>,
}

/// Differences found directly inside one relative directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDiff {
    /// Root-relative path, `""` for the top level
    pub path: String,
    pub entries: Vec<EntryDiff>,
}

impl LevelDiff {
    /// Entries of `kind` missing from root `idx`
    pub fn missing_from(&self, idx: usize, kind: EntryKind) -> impl Iterator<Item = &EntryDiff> {
        self.entries
            .iter()
            .filter(move |e| e.kind == kind && e.missing_from.contains(&idx))
    }
}

/// Result of comparing several roots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffReport {
    pub roots: Vec<PathBuf>,
    /// Set when the roots' own directory names are not all equal
    pub root_names_differ: bool,
    pub levels: Vec<LevelDiff>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of differing entries across all levels
    pub fn total_entries(&self) -> usize {
        self.levels.iter().map(|l| l.entries.len()).sum()
    }

    pub fn level(&self, path: &str) -> Option<&LevelDiff> {
        self.levels.iter().find(|l| l.path == path)
    }
}

/// Count names per extension, in first-seen order
///
/// Used to summarise long lists of missing files.
pub fn extension_counts<'a, I>(names: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    group_by_key(names, |name| extension_of(name).to_string())
        .into_iter()
        .map(|group| (group.key, group.items.len()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_counts() {
        let counts = extension_counts(["a.jpg", "b.png", "c.jpg", "Makefile"]);
        assert_eq!(
            counts,
            vec![
                (".jpg".to_string(), 2),
                (".png".to_string(), 1),
                (String::new(), 1)
            ]
        );
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = DiffReport {
            roots: vec![PathBuf::from("/a"), PathBuf::from("/b")],
            root_names_differ: true,
            levels: vec![LevelDiff {
                path: String::new(),
                entries: vec![EntryDiff {
                    name: "x.txt".to_string(),
                    kind: EntryKind::File,
                    present_in: vec![0],
                    missing_from: vec![1],
                }],
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rootNamesDiffer"], true);
        assert_eq!(json["levels"][0]["entries"][0]["kind"], "file");
        assert_eq!(json["levels"][0]["entries"][0]["missingFrom"][0], 1);
        assert_eq!(report.total_entries(), 1);
    }
}
