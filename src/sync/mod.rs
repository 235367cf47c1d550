//! N-way synchronization of directory snapshots

mod engine;
pub mod group;

pub use engine::{sync_trees, SyncEngine, SyncStats, GROUP_THRESHOLD};
