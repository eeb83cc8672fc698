//! Filesystem utilities for careful output.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{PaperCryptError, Result};

/// Write `contents` to `destination` through a temp file in the same directory.
///
/// An existing destination is only replaced when `overwrite` is set. On Unix
/// the file is created with mode `0600`.
///
/// # Errors
///
/// Returns `AlreadyExists` if the destination exists and `overwrite` is false,
/// or `Io` if the write or rename fails. The temp file is removed on failure.
pub fn write_file_carefully(destination: &Path, contents: &[u8], overwrite: bool) -> Result<()> {
    if destination.exists() && !overwrite {
        return Err(PaperCryptError::AlreadyExists(
            destination.display().to_string(),
        ));
    }

    let temp_path = temp_path_for(destination);
    if let Err(err) = write_new(&temp_path, contents) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    rename_with_fallback(&temp_path, destination)?;

    tracing::debug!(
        path = %destination.display(),
        bytes = contents.len(),
        "wrote output file"
    );
    Ok(())
}

fn temp_path_for(destination: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let name = destination
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "papercrypt".to_string());
    destination.with_file_name(format!(".{}.{}-{}.tmp", name, std::process::id(), nanos))
}

fn write_new(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Atomically rename a file, with fallback for platforms where rename fails if target exists.
///
/// On some platforms (notably Windows), `fs::rename` fails if the destination already exists.
/// This function handles that case by removing the destination first and retrying.
///
/// If the rename ultimately fails, the temp file is cleaned up.
pub fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        // Best-effort replace on platforms where rename fails if target exists.
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_new_file() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("sheet.txt");

        write_file_carefully(&dest, b"SerialNumber: ABC123\n", false).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "SerialNumber: ABC123\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("sheet.txt");
        fs::write(&dest, b"old").unwrap();

        let err = write_file_carefully(&dest, b"new", false).unwrap_err();
        assert!(matches!(err, PaperCryptError::AlreadyExists(_)));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old");
    }

    #[test]
    fn test_overwrite_when_forced() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("sheet.txt");
        fs::write(&dest, b"old").unwrap();

        write_file_carefully(&dest, b"new", true).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("plain.bin");
        write_file_carefully(&dest, b"secret", false).unwrap();

        let mode = fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_missing_directory_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("missing").join("sheet.txt");

        let err = write_file_carefully(&dest, b"data", false).unwrap_err();
        assert!(matches!(err, PaperCryptError::Io { .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
