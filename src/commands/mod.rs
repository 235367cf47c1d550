//! Subcommand implementations

pub mod analyse;
pub mod sync;
