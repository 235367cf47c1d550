//! Validated run configuration

mod cli;

pub use cli::{AnalyseArgs, Cli, Commands, SyncArgs};

use crate::executor::ERROR_REPORT_FILE_NAME;
use crate::types::DirsyncError;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for one `sync` run
#[derive(Debug, Clone)]
pub struct Config {
    /// Canonical root paths, in command-line order
    pub roots: Vec<PathBuf>,

    /// Overwrite mode requested (reported as unsupported)
    pub force: bool,

    /// Answer every question with "yes"
    pub assume_yes: bool,

    /// Where the copy error report goes if anything fails
    pub error_report: PathBuf,
}

impl TryFrom<SyncArgs> for Config {
    type Error = DirsyncError;

    fn try_from(args: SyncArgs) -> Result<Self, Self::Error> {
        let roots = validate_roots(&args.roots)?;
        Ok(Self {
            roots,
            force: args.force,
            assume_yes: args.yes,
            error_report: env::current_dir()?.join(ERROR_REPORT_FILE_NAME),
        })
    }
}

/// Configuration for one `analyse` run
#[derive(Debug, Clone)]
pub struct AnalyseConfig {
    pub roots: Vec<PathBuf>,

    /// `None` compares the whole trees
    pub max_depth: Option<usize>,

    /// JSON output file, printed to stdout when absent
    pub output: Option<PathBuf>,
}

impl TryFrom<AnalyseArgs> for AnalyseConfig {
    type Error = DirsyncError;

    fn try_from(args: AnalyseArgs) -> Result<Self, Self::Error> {
        // Depth is checked together with the roots so every problem is listed at once
        let mut problems = Vec::new();
        let max_depth = match args.depth {
            -1 => None,
            d if d < 0 => {
                problems.push(format!("Depth {} is not valid, use -1 for unlimited", d));
                None
            }
            d => usize::try_from(d).ok(),
        };

        let roots = match validate_roots(&args.roots) {
            Ok(roots) => roots,
            Err(DirsyncError::Precondition(mut messages)) => {
                problems.append(&mut messages);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        if !problems.is_empty() {
            return Err(DirsyncError::Precondition(problems));
        }

        Ok(Self {
            roots,
            max_depth,
            output: args.output,
        })
    }
}

/// Check the root list and return canonical paths
///
/// Reports every problem found: fewer than two roots, missing or non-directory
/// roots, the same directory given twice, one root inside another.
pub fn validate_roots(roots: &[PathBuf]) -> Result<Vec<PathBuf>, DirsyncError> {
    let mut problems = Vec::new();
    if roots.len() < 2 {
        problems.push(format!(
            "At least two root directories are required, got {}",
            roots.len()
        ));
    }

    let mut canonical: Vec<(PathBuf, &Path)> = Vec::with_capacity(roots.len());
    for root in roots {
        match fs::metadata(root) {
            Err(_) => problems.push(format!("Directory \"{}\" does not exist", root.display())),
            Ok(meta) if !meta.is_dir() => {
                problems.push(format!("\"{}\" is not a directory", root.display()))
            }
            Ok(_) => match fs::canonicalize(root) {
                Ok(path) => canonical.push((path, root.as_path())),
                Err(e) => problems.push(format!("Cannot resolve \"{}\": {}", root.display(), e)),
            },
        }
    }

    for (i, (path, given)) in canonical.iter().enumerate() {
        for (other, other_given) in &canonical[..i] {
            if path == other {
                problems.push(format!(
                    "\"{}\" and \"{}\" are the same directory",
                    other_given.display(),
                    given.display()
                ));
            } else if path.starts_with(other) {
                problems.push(format!(
                    "\"{}\" is inside \"{}\"",
                    given.display(),
                    other_given.display()
                ));
            } else if other.starts_with(path) {
                problems.push(format!(
                    "\"{}\" is inside \"{}\"",
                    other_given.display(),
                    given.display()
                ));
            }
        }
    }

    if problems.is_empty() {
        Ok(canonical.into_iter().map(|(path, _)| path).collect())
    } else {
        Err(DirsyncError::Precondition(problems))
    }
}
