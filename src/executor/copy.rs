//! Atomic file copy implementation

use crate::types::DirsyncError;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// Suffix of the temporary file a copy is streamed into
pub const PART_SUFFIX: &str = ".dirsync-part";

/// Copy a file atomically using the write-then-rename strategy
///
/// 1. Refuse if the destination already exists (dirsync never overwrites)
/// 2. Stream into a `.dirsync-part` sibling and sync it to disk
/// 3. Carry over permissions and mtime
/// 4. Rename into place
///
/// The partial file is removed if any step fails.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(DirsyncError::Copy)` - the failing path and IO error
///
/// # Example
/// ```no_run
/// use dirsync::executor::copy_file_atomic;
/// use std::path::Path;
///
/// let bytes = copy_file_atomic(Path::new("a/notes.txt"), Path::new("b/notes.txt"))?;
/// # Ok::<(), dirsync::DirsyncError>(())
/// ```
pub fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64, DirsyncError> {
    if fs::symlink_metadata(dest).is_ok() {
        return Err(copy_error(
            dest,
            std::io::Error::new(ErrorKind::AlreadyExists, "destination already exists"),
        ));
    }

    let part_path = part_path_for(dest);
    match stream_into(src, &part_path) {
        Ok(bytes) => match fs::rename(&part_path, dest) {
            Ok(()) => Ok(bytes),
            Err(e) => {
                let _ = fs::remove_file(&part_path);
                Err(copy_error(dest, e))
            }
        },
        Err(e) => {
            let _ = fs::remove_file(&part_path);
            Err(e)
        }
    }
}

/// Create a single directory (the parent must exist)
pub fn create_dir(path: &Path) -> Result<(), DirsyncError> {
    fs::create_dir(path).map_err(|e| copy_error(path, e))
}

fn stream_into(src: &Path, part_path: &Path) -> Result<u64, DirsyncError> {
    let mut src_file = File::open(src).map_err(|e| copy_error(src, e))?;
    let mut part_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(part_path)
        .map_err(|e| copy_error(part_path, e))?;

    let mut buffer = vec![0u8; 128 * 1024];
    let mut total_bytes = 0u64;
    loop {
        let bytes_read = src_file.read(&mut buffer).map_err(|e| copy_error(src, e))?;
        if bytes_read == 0 {
            break;
        }
        part_file
            .write_all(&buffer[..bytes_read])
            .map_err(|e| copy_error(part_path, e))?;
        total_bytes += bytes_read as u64;
    }

    part_file.sync_all().map_err(|e| copy_error(part_path, e))?;
    // Drop the handle before rename (required on Windows)
    drop(part_file);

    let src_metadata = fs::metadata(src).map_err(|e| copy_error(src, e))?;
    fs::set_permissions(part_path, src_metadata.permissions())
        .map_err(|e| copy_error(part_path, e))?;
    let mtime = src_metadata.modified().map_err(|e| copy_error(src, e))?;
    filetime::set_file_mtime(part_path, filetime::FileTime::from_system_time(mtime))
        .map_err(|e| copy_error(part_path, e))?;

    Ok(total_bytes)
}

fn part_path_for(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(PART_SUFFIX);
    dest.with_file_name(name)
}

fn copy_error(path: &Path, source: std::io::Error) -> DirsyncError {
    DirsyncError::Copy {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_path_keeps_original_extension() {
        assert_eq!(
            part_path_for(Path::new("/x/report.pdf")),
            PathBuf::from("/x/report.pdf.dirsync-part")
        );
    }
}
