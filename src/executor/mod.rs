//! Executor module for file operations

pub mod copy;

use crate::types::DirsyncError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use copy::{copy_file_atomic, create_dir, PART_SUFFIX};

/// File name of the error report written when copies fail
pub const ERROR_REPORT_FILE_NAME: &str = "dirsync-errors.json";

/// Filesystem primitives used by the sync engine
///
/// Either succeeds or raises a reportable error; the engine never retries.
pub trait FileOps {
    /// Copy one file, never overwriting an existing destination
    fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64, DirsyncError>;

    /// Create one (empty) directory
    fn create_dir(&self, path: &Path) -> Result<(), DirsyncError>;
}

/// Local filesystem implementation of [`FileOps`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileOps for LocalFs {
    fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64, DirsyncError> {
        copy_file_atomic(src, dest)
    }

    fn create_dir(&self, path: &Path) -> Result<(), DirsyncError> {
        create_dir(path)
    }
}

/// Kind of filesystem action that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedAction {
    CopyFile,
    CreateFolder,
}

/// One failed copy or folder creation, collected instead of aborting the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFailure {
    pub action: FailedAction,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub error: String,
}

impl CopyFailure {
    pub fn new(action: FailedAction, source: &Path, destination: &Path, error: &DirsyncError) -> Self {
        Self {
            action,
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            error: error.to_string(),
        }
    }
}

/// Write collected failures as a JSON array
pub fn write_error_report(path: &Path, failures: &[CopyFailure]) -> Result<(), DirsyncError> {
    let json = serde_json::to_string_pretty(failures)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};
    use tempfile::TempDir;

    #[test]
    fn test_local_fs_create_dir_requires_parent() {
        let temp_dir = TempDir::new().unwrap();
        let ops = LocalFs;

        ops.create_dir(&temp_dir.path().join("new")).unwrap();
        assert!(temp_dir.path().join("new").is_dir());

        let err = ops.create_dir(&temp_dir.path().join("missing/child")).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_local_fs_create_dir_fails_if_present() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("here")).unwrap();
        assert!(LocalFs.create_dir(&temp_dir.path().join("here")).is_err());
    }

    #[test]
    fn test_error_report_is_json_array() {
        let temp_dir = TempDir::new().unwrap();
        let report = temp_dir.path().join(ERROR_REPORT_FILE_NAME);
        let err = DirsyncError::Copy {
            path: PathBuf::from("/b/x.txt"),
            source: IoError::new(ErrorKind::PermissionDenied, "denied"),
        };
        let failures = vec![CopyFailure::new(
            FailedAction::CopyFile,
            Path::new("/a/x.txt"),
            Path::new("/b/x.txt"),
            &err,
        )];

        write_error_report(&report, &failures).unwrap();

        let raw = fs::read_to_string(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let items = value.as_array().expect("report is an array");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["action"], "copy_file");
        assert_eq!(items[0]["destination"], "/b/x.txt");
        assert!(items[0]["error"].as_str().unwrap().contains("denied"));
    }
}
