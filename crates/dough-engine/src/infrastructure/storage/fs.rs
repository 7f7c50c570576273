//! Local-disk [`DocumentRepository`].
//!
//! # On-disk layout
//!
//! ```text
//! Config/
//! ├── EngineCore.cfg
//! ├── EngineVideo.cfg
//! ├── EngineCore.cfg.corrupt.1760600000   ← quarantined, never reloaded
//! └── backups/
//!     ├── EngineCore.cfg.1                 ← newest
//!     └── EngineCore.cfg.2
//! ```
//!
//! Writes go to `<file>.tmp` first and are renamed over the target, so a
//! crash mid-write leaves either the old or the new document, never half of
//! one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::application::store::DocumentRepository;

/// Name of the sub-directory holding rotated backups.
pub const BACKUP_DIR: &str = "backups";

/// [`DocumentRepository`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocumentRepository;

impl FsDocumentRepository {
    pub fn new() -> Self {
        Self
    }
}

/// Appends `suffix` to the file name of `path` (`a.cfg` → `a.cfg.tmp`).
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn file_name_of(path: &Path) -> io::Result<&std::ffi::OsStr> {
    path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", path.display()),
        )
    })
}

impl DocumentRepository for FsDocumentRepository {
    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let tmp = with_suffix(path, ".tmp");
        fs::write(&tmp, contents)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(())
    }

    fn quarantine(&self, path: &Path) -> io::Result<PathBuf> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let moved = with_suffix(path, &format!(".corrupt.{timestamp}"));
        fs::rename(path, &moved)?;
        Ok(moved)
    }

    fn backup(&self, path: &Path, history: usize) -> io::Result<()> {
        if history == 0 {
            return Ok(());
        }
        let name = file_name_of(path)?;
        let dir = path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(BACKUP_DIR);
        fs::create_dir_all(&dir)?;

        let slot = |n: usize| {
            let mut slot_name = name.to_os_string();
            slot_name.push(format!(".{n}"));
            dir.join(slot_name)
        };

        // Shift N-1 → N, …, 1 → 2; the oldest falls off the end.
        for n in (1..history).rev() {
            let from = slot(n);
            if from.exists() {
                fs::rename(&from, slot(n + 1))?;
            }
        }
        fs::copy(path, slot(1))?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dough_fs_test_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn test_write_replaces_content_and_leaves_no_temp_file() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("EngineCore.cfg");
        let repo = FsDocumentRepository::new();

        // Act
        repo.write(&path, "A = 1\n").unwrap();
        repo.write(&path, "A = 2\n").unwrap();

        // Assert
        assert_eq!(fs::read_to_string(&path).unwrap(), "A = 2\n");
        assert!(!dir.join("EngineCore.cfg.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_list_files_skips_directories() {
        let dir = temp_dir();
        fs::write(dir.join("a.cfg"), "").unwrap();
        fs::create_dir_all(dir.join("nested.cfg")).unwrap();
        let repo = FsDocumentRepository::new();

        let files = repo.list_files(&dir).unwrap();

        assert_eq!(files, vec![dir.join("a.cfg")]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_quarantine_moves_file_aside() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("bad.cfg");
        fs::write(&path, "[[[").unwrap();
        let repo = FsDocumentRepository::new();

        // Act
        let moved = repo.quarantine(&path).unwrap();

        // Assert
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(&moved).unwrap(), "[[[");
        let moved_name = moved.file_name().unwrap().to_string_lossy().into_owned();
        assert!(moved_name.starts_with("bad.cfg.corrupt."), "{moved_name}");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_backup_rotates_and_caps_history() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("v.cfg");
        let repo = FsDocumentRepository::new();

        // Act: three generations with a history of two
        for generation in 1..=3 {
            fs::write(&path, format!("Gen = {generation}\n")).unwrap();
            repo.backup(&path, 2).unwrap();
        }

        // Assert
        let backups = dir.join(BACKUP_DIR);
        assert_eq!(fs::read_to_string(backups.join("v.cfg.1")).unwrap(), "Gen = 3\n");
        assert_eq!(fs::read_to_string(backups.join("v.cfg.2")).unwrap(), "Gen = 2\n");
        assert!(!backups.join("v.cfg.3").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_backup_with_zero_history_is_a_no_op() {
        let dir = temp_dir();
        let path = dir.join("v.cfg");
        fs::write(&path, "").unwrap();

        FsDocumentRepository::new().backup(&path, 0).unwrap();

        assert!(!dir.join(BACKUP_DIR).exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
