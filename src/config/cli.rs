//! Command-line arguments

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Keep two or more directory trees in sync, one question at a time
#[derive(Parser, Debug)]
#[command(name = "dirsync", version, about)]
pub struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize root directories interactively
    #[command(alias = "s")]
    Sync(SyncArgs),

    /// Compare root directories and report what differs
    #[command(alias = "a")]
    Analyse(AnalyseArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Root directories (two or more)
    #[arg(required = true)]
    pub roots: Vec<PathBuf>,

    /// Resolve conflicting entries by overwriting (not supported yet)
    #[arg(short, long)]
    pub force: bool,

    /// Answer "yes" to every question
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyseArgs {
    /// Root directories (two or more)
    #[arg(required = true)]
    pub roots: Vec<PathBuf>,

    /// Levels of subfolders to compare below the top-level folders, -1 for unlimited
    #[arg(short, long, default_value_t = 10, allow_negative_numbers = true)]
    pub depth: i64,

    /// Write the report as JSON to this file instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
