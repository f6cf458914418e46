//! Atomic file replacement for the notes file.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{NoteLockError, Result};

/// Write `data` to `path` through a sibling temp file and a rename.
///
/// The file is created owner-only on unix. Readers see either the old or
/// the new contents, never a partial write.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| NoteLockError::Storage("Invalid notes filename".to_string()))?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| NoteLockError::Storage(format!("System time error: {}", e)))?
        .as_nanos();
    let temp_path = parent.join(format!(".{}.{}.tmp", filename, nanos));

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(&temp_path)
        .map_err(|e| NoteLockError::Storage(format!("Temp file create failed: {}", e)))?;
    let written = file.write_all(data).and_then(|_| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(NoteLockError::Storage(format!(
            "Temp file write failed: {}",
            e
        )));
    }

    rename_with_fallback(&temp_path, path)
        .map_err(|e| NoteLockError::Storage(format!("Atomic rename failed: {}", e)))
}

/// Rename, removing an existing destination first where rename refuses to
/// replace it. The temp file is removed if both attempts fail.
fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(first) = fs::rename(temp_path, destination) {
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|second| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                second.kind(),
                format!("first attempt: {}, retry: {}", first, second),
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
    fn test_write_atomic_creates_and_replaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("notes.json");

        write_atomic(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");
        write_atomic(&path, b"{}").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
