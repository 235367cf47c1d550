//! # dirsync - interactive N-way directory synchronization
//!
//! Keeps two or more directory trees holding the same set of entries. Every
//! entry missing somewhere is offered for copying; refusals are remembered
//! per root in a small JSON file so the same question is never asked twice.
//!
//! Only presence is compared. Files that exist everywhere are never
//! overwritten, whatever their content.

pub mod commands;
pub mod config;
pub mod decide;
pub mod diff;
pub mod executor;
pub mod matcher;
pub mod scanner;
pub mod store;
pub mod sync;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::{AnalyseConfig, Config};
pub use types::{DirectoryIdentity, DirsyncError, PolicyBook, RootPolicy, TreeSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
