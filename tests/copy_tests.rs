//! Tests for atomic file copy operations

use dirsync::executor::{copy_file_atomic, FileOps, LocalFs};
use dirsync::DirsyncError;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn create_test_file(path: &Path, content: &[u8]) {
    let mut file = fs::File::create(path).expect("Failed to create test file");
    file.write_all(content).expect("Failed to write test content");
    file.flush().expect("Failed to flush");
}

fn set_file_mtime(path: &Path, mtime: SystemTime) {
    let filetime_mtime = filetime::FileTime::from_system_time(mtime);
    filetime::set_file_mtime(path, filetime_mtime).expect("Failed to set mtime");
}

#[test]
fn test_copy_basic_content() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    let src_path = root.join("source.txt");
    let content = b"Hello, dirsync! This is a test file.";
    create_test_file(&src_path, content);

    let dest_path = root.join("dest.txt");
    let bytes_copied = copy_file_atomic(&src_path, &dest_path).expect("copy should succeed");

    assert_eq!(bytes_copied, content.len() as u64);
    assert_eq!(fs::read(&dest_path).expect("Failed to read dest file"), content);
}

#[test]
fn test_copy_never_overwrites() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    let src_path = root.join("source.txt");
    create_test_file(&src_path, b"new");
    let dest_path = root.join("dest.txt");
    create_test_file(&dest_path, b"precious");

    let err = copy_file_atomic(&src_path, &dest_path).expect_err("existing destination must fail");

    assert!(matches!(err, DirsyncError::Copy { .. }));
    assert_eq!(fs::read(&dest_path).unwrap(), b"precious");
}

#[test]
fn test_copy_requires_existing_parent() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    let src_path = root.join("source.txt");
    create_test_file(&src_path, b"test content");

    let dest_path = root.join("a/b/dest.txt");
    assert!(copy_file_atomic(&src_path, &dest_path).is_err());
    assert!(!root.join("a").exists(), "folders are created by the engine, not the copier");
}

#[test]
fn test_copy_missing_source_leaves_nothing_behind() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    let dest_path = root.join("dest.txt");
    let err = copy_file_atomic(&root.join("absent.txt"), &dest_path).unwrap_err();

    assert!(err.is_recoverable());
    assert!(!dest_path.exists());
    assert!(!root.join("dest.txt.dirsync-part").exists());
}

#[test]
fn test_copy_preserves_mtime() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    let src_path = root.join("source.txt");
    create_test_file(&src_path, b"test content");
    let mtime = SystemTime::now() - Duration::from_secs(3600);
    set_file_mtime(&src_path, mtime);

    let dest_path = root.join("dest.txt");
    copy_file_atomic(&src_path, &dest_path).expect("copy should succeed");

    let src_mtime = fs::metadata(&src_path).unwrap().modified().unwrap();
    let dest_mtime = fs::metadata(&dest_path).unwrap().modified().unwrap();
    let diff = if src_mtime > dest_mtime {
        src_mtime.duration_since(dest_mtime).unwrap()
    } else {
        dest_mtime.duration_since(src_mtime).unwrap()
    };

    assert!(
        diff < Duration::from_secs(2),
        "mtime should be preserved (diff: {:?})",
        diff
    );
}

#[test]
fn test_copy_removes_part_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    let src_path = root.join("source.txt");
    create_test_file(&src_path, b"test content");
    let dest_path = root.join("dest.txt");

    copy_file_atomic(&src_path, &dest_path).expect("copy should succeed");

    assert!(!root.join("dest.txt.dirsync-part").exists());
    assert!(dest_path.exists());
}

#[test]
fn test_copy_large_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    let src_path = root.join("large.bin");
    let size = 1024 * 1024;
    let content: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();
    create_test_file(&src_path, &content);

    let dest_path = root.join("large_copy.bin");
    let bytes_copied = LocalFs
        .copy_file(&src_path, &dest_path)
        .expect("copy should handle large files");

    assert_eq!(bytes_copied, size as u64);
    assert_eq!(fs::read(&dest_path).unwrap(), content);
}

#[test]
#[cfg(unix)]
fn test_copy_preserves_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    let src_path = root.join("source.txt");
    create_test_file(&src_path, b"test content");
    let mut perms = fs::metadata(&src_path).unwrap().permissions();
    perms.set_mode(0o640);
    fs::set_permissions(&src_path, perms).unwrap();

    let dest_path = root.join("dest.txt");
    copy_file_atomic(&src_path, &dest_path).expect("copy should succeed");

    let src_mode = fs::metadata(&src_path).unwrap().permissions().mode();
    let dest_mode = fs::metadata(&dest_path).unwrap().permissions().mode();
    assert_eq!(src_mode & 0o777, dest_mode & 0o777, "Permissions should be preserved");
}
