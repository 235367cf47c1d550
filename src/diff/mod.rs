//! Analyser - read-only comparison of several roots

mod compare;
mod report;

pub use compare::analyse;
pub use report::{extension_counts, DiffReport, EntryDiff, EntryKind, LevelDiff};
