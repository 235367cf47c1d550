//! Root identities and their exclude/skip policies

use crate::matcher::PatternSet;
use crate::types::DirsyncError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a root directory, persisted in its config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectoryIdentity(Uuid);

impl DirectoryIdentity {
    /// Generate a fresh random identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DirectoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DirectoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for DirectoryIdentity {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Exclude and skip patterns of one root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootPolicy {
    /// Entries that stay in this root only
    pub exclude_from_sync: PatternSet,

    /// Entries that must never be copied into this root
    pub skip_syncing: PatternSet,
}

impl RootPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `path` may not be copied into this root
    pub fn blocks_incoming(&self, path: &str) -> bool {
        self.skip_syncing.is_match(path) || self.exclude_from_sync.is_match(path)
    }

    /// True if `path` may not leave this root
    pub fn blocks_outgoing(&self, path: &str) -> bool {
        self.exclude_from_sync.is_match(path)
    }
}

/// Policies of every known root, keyed by identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyBook {
    policies: BTreeMap<DirectoryIdentity, RootPolicy>,
}

impl PolicyBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy for `id`, created empty if unknown
    pub fn entry(&mut self, id: DirectoryIdentity) -> &mut RootPolicy {
        self.policies.entry(id).or_default()
    }

    pub fn get(&self, id: &DirectoryIdentity) -> Option<&RootPolicy> {
        self.policies.get(id)
    }

    pub fn contains(&self, id: &DirectoryIdentity) -> bool {
        self.policies.contains_key(id)
    }

    pub fn blocks_incoming(&self, id: &DirectoryIdentity, path: &str) -> bool {
        self.policies
            .get(id)
            .is_some_and(|policy| policy.blocks_incoming(path))
    }

    pub fn blocks_outgoing(&self, id: &DirectoryIdentity, path: &str) -> bool {
        self.policies
            .get(id)
            .is_some_and(|policy| policy.blocks_outgoing(path))
    }

    /// Add exclude patterns to `id`
    pub fn exclude<I, S>(&mut self, id: DirectoryIdentity, patterns: I) -> Result<(), DirsyncError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entry(id).exclude_from_sync.extend(patterns)
    }

    /// Add skip patterns to `id`
    pub fn skip<I, S>(&mut self, id: DirectoryIdentity, patterns: I) -> Result<(), DirsyncError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entry(id).skip_syncing.extend(patterns)
    }

    /// Union another copy of a policy into this book
    pub fn absorb(&mut self, id: DirectoryIdentity, policy: &RootPolicy) -> Result<(), DirsyncError> {
        let own = self.entry(id);
        own.exclude_from_sync.extend(policy.exclude_from_sync.iter())?;
        own.skip_syncing.extend(policy.skip_syncing.iter())?;
        Ok(())
    }

    /// Drop exclude patterns of `id` that filtered nothing during the last walk
    pub fn prune_excludes(
        &mut self,
        id: &DirectoryIdentity,
        used: &HashSet<String>,
    ) -> Result<Vec<String>, DirsyncError> {
        match self.policies.get_mut(id) {
            Some(policy) => policy.exclude_from_sync.retain_used(used),
            None => Ok(Vec::new()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DirectoryIdentity, &RootPolicy)> {
        self.policies.iter()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_roundtrips_through_string() {
        let id = DirectoryIdentity::new();
        let parsed: DirectoryIdentity = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<DirectoryIdentity>().is_err());
    }

    #[test]
    fn test_identity_serializes_as_plain_string() {
        let id: DirectoryIdentity = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"67e55044-10b1-426f-9247-bb680e5fe0c8\"");
    }

    #[test]
    fn test_skip_blocks_only_incoming() {
        let mut book = PolicyBook::new();
        let id = DirectoryIdentity::new();
        book.skip(id, ["big.iso"]).unwrap();

        assert!(book.blocks_incoming(&id, "big.iso"));
        assert!(!book.blocks_outgoing(&id, "big.iso"));
    }

    #[test]
    fn test_exclude_blocks_both_directions() {
        let mut book = PolicyBook::new();
        let id = DirectoryIdentity::new();
        book.exclude(id, ["local/*"]).unwrap();

        assert!(book.blocks_outgoing(&id, "local/notes.txt"));
        assert!(book.blocks_incoming(&id, "local/notes.txt"));
        assert!(!book.blocks_outgoing(&id, "shared/notes.txt"));
    }

    #[test]
    fn test_unknown_identity_blocks_nothing() {
        let book = PolicyBook::new();
        let id = DirectoryIdentity::new();
        assert!(!book.blocks_incoming(&id, "x"));
        assert!(!book.blocks_outgoing(&id, "x"));
    }

    #[test]
    fn test_absorb_takes_union() {
        let id = DirectoryIdentity::new();
        let mut book = PolicyBook::new();
        book.exclude(id, ["a"]).unwrap();

        let mut other = RootPolicy::new();
        other.exclude_from_sync.extend(["a", "b"]).unwrap();
        other.skip_syncing.extend(["c"]).unwrap();
        book.absorb(id, &other).unwrap();

        let policy = book.get(&id).unwrap();
        assert_eq!(policy.exclude_from_sync.to_vec(), vec!["a", "b"]);
        assert_eq!(policy.skip_syncing.to_vec(), vec!["c"]);
    }

    #[test]
    fn test_prune_excludes_keeps_used() {
        let id = DirectoryIdentity::new();
        let mut book = PolicyBook::new();
        book.exclude(id, ["gone.txt", "kept/*"]).unwrap();
        book.skip(id, ["never-pruned"]).unwrap();

        let used: HashSet<String> = ["kept/*".to_string()].into_iter().collect();
        let dropped = book.prune_excludes(&id, &used).unwrap();

        assert_eq!(dropped, vec!["gone.txt".to_string()]);
        let policy = book.get(&id).unwrap();
        assert_eq!(policy.exclude_from_sync.to_vec(), vec!["kept/*"]);
        assert_eq!(policy.skip_syncing.to_vec(), vec!["never-pruned"]);
    }
}
