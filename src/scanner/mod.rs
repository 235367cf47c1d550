//! Directory scanning logic

mod walker;

pub use walker::{is_system_entry, BuiltTree, ProgressCallback, SnapshotBuilder};
