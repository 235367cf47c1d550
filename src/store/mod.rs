//! Per-root persisted policy
//!
//! Every root carries a `dirsync.config.json` holding its own identity and
//! the last known policy of every root it was ever synced with. The copies
//! are backups of one shared policy, so loading takes the union of all of
//! them.

use crate::types::{DirectoryIdentity, DirsyncError, PolicyBook, RootPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the config stored at the top of every root
pub const CONFIG_FILE_NAME: &str = "dirsync.config.json";

/// Temporary sibling the config is written to before the rename
pub const CONFIG_TMP_FILE_NAME: &str = "dirsync.config.json.tmp";

/// On-disk config document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub dirsync_version: String,
    pub last_sync_date: DateTime<Utc>,
    pub this_dir_uuid: DirectoryIdentity,
    #[serde(default)]
    pub dirs: Vec<PolicyRecord>,

    /// Single-root layout written by early versions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_from_sync: Vec<String>,

    /// Single-root layout written by early versions
    #[serde(default, rename = "skipSync", skip_serializing_if = "Vec::is_empty")]
    pub skip_sync: Vec<String>,
}

/// Persisted policy of one root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRecord {
    pub uuid: DirectoryIdentity,
    #[serde(default)]
    pub exclude_from_sync: Vec<String>,
    #[serde(default)]
    pub skip_syncing: Vec<String>,
}

impl PolicyRecord {
    fn from_policy(uuid: DirectoryIdentity, policy: Option<&RootPolicy>) -> Self {
        match policy {
            Some(policy) => Self {
                uuid,
                exclude_from_sync: policy.exclude_from_sync.to_vec(),
                skip_syncing: policy.skip_syncing.to_vec(),
            },
            None => Self {
                uuid,
                exclude_from_sync: Vec::new(),
                skip_syncing: Vec::new(),
            },
        }
    }
}

/// Identities of the participating roots (in root order) and the merged policy
#[derive(Debug, Clone)]
pub struct MergedPolicy {
    pub identities: Vec<DirectoryIdentity>,
    pub policies: PolicyBook,
}

/// Path of the config file inside `root`
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Read one config file; a missing file is `Ok(None)`
///
/// # Errors
/// A file that exists but does not parse is `DirsyncError::CorruptConfig`.
pub fn read_config(path: &Path) -> Result<Option<ConfigFile>, DirsyncError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(DirsyncError::Io(e)),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| DirsyncError::CorruptConfig {
            path: path.to_path_buf(),
            source,
        })
}

/// Read the config file of every root, in root order
pub fn load(roots: &[PathBuf]) -> Result<Vec<Option<ConfigFile>>, DirsyncError> {
    roots
        .iter()
        .map(|root| {
            let config = read_config(&config_path(root))?;
            debug!(root = %root.display(), found = config.is_some(), "config loaded");
            Ok(config)
        })
        .collect()
}

/// Merge loaded configs into identities and one policy book
///
/// Roots without a config get a fresh identity. Every identity found in any
/// config contributes the union of all its copies.
///
/// # Errors
/// - `DuplicateIdentity` if two roots claim the same identity
/// - `Pattern` if any stored pattern does not compile
pub fn merge(roots: &[PathBuf], configs: &[Option<ConfigFile>]) -> Result<MergedPolicy, DirsyncError> {
    let mut identities: Vec<DirectoryIdentity> = Vec::with_capacity(roots.len());
    let mut policies = PolicyBook::new();

    for (idx, config) in configs.iter().enumerate() {
        let identity = match config {
            Some(config) => config.this_dir_uuid,
            None => {
                let fresh = DirectoryIdentity::new();
                info!(root = %roots[idx].display(), identity = %fresh, "assigned new identity");
                fresh
            }
        };

        if let Some(first) = identities.iter().position(|known| *known == identity) {
            return Err(DirsyncError::DuplicateIdentity {
                identity: identity.to_string(),
                first: roots[first].clone(),
                second: roots[idx].clone(),
            });
        }
        identities.push(identity);
    }

    for config in configs.iter().flatten() {
        for record in &config.dirs {
            let mut policy = RootPolicy::new();
            policy.exclude_from_sync.extend(&record.exclude_from_sync)?;
            policy.skip_syncing.extend(&record.skip_syncing)?;
            policies.absorb(record.uuid, &policy)?;
        }
        policies.exclude(config.this_dir_uuid, &config.exclude_from_sync)?;
        policies.skip(config.this_dir_uuid, &config.skip_sync)?;
    }

    for identity in &identities {
        policies.entry(*identity);
    }

    Ok(MergedPolicy {
        identities,
        policies,
    })
}

/// Drop the exclude patterns of each participating root that filtered nothing
pub fn prune(
    policies: &mut PolicyBook,
    identities: &[DirectoryIdentity],
    used: &[HashSet<String>],
) -> Result<(), DirsyncError> {
    for (identity, used) in identities.iter().zip(used) {
        let dropped = policies.prune_excludes(identity, used)?;
        if !dropped.is_empty() {
            info!(identity = %identity, ?dropped, "pruned unused exclude patterns");
        }
    }
    Ok(())
}

/// Render the config document written into the root with identity `this`
///
/// `dirs` lists participating roots first (in root order), then every other
/// known identity in sorted order.
pub fn render(
    this: DirectoryIdentity,
    identities: &[DirectoryIdentity],
    policies: &PolicyBook,
    now: DateTime<Utc>,
) -> ConfigFile {
    let mut dirs: Vec<PolicyRecord> = identities
        .iter()
        .map(|id| PolicyRecord::from_policy(*id, policies.get(id)))
        .collect();
    dirs.extend(
        policies
            .iter()
            .filter(|(id, _)| !identities.contains(id))
            .map(|(id, policy)| PolicyRecord::from_policy(*id, Some(policy))),
    );

    ConfigFile {
        dirsync_version: crate::VERSION.to_string(),
        last_sync_date: now,
        this_dir_uuid: this,
        dirs,
        exclude_from_sync: Vec::new(),
        skip_sync: Vec::new(),
    }
}

/// Write one config file per root
///
/// Each file is written to a temporary sibling and renamed into place. The
/// set of files is not written atomically as a whole.
pub fn save(
    roots: &[PathBuf],
    identities: &[DirectoryIdentity],
    policies: &PolicyBook,
    now: DateTime<Utc>,
) -> Result<(), DirsyncError> {
    for (root, identity) in roots.iter().zip(identities) {
        let config = render(*identity, identities, policies, now);
        let json = serde_json::to_string_pretty(&config)?;

        let path = config_path(root);
        let tmp_path = root.join(CONFIG_TMP_FILE_NAME);
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;
        info!(path = %path.display(), "config written");
    }
    Ok(())
}
