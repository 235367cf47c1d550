//! Core type definitions for dirsync

mod error;
mod policy;
mod tree;

pub use error::DirsyncError;
pub use policy::{DirectoryIdentity, PolicyBook, RootPolicy};
pub use tree::TreeSnapshot;
