//! Persistence collaborator for the note list.
//!
//! Stores only ever see notes in their persisted form: locked notes arrive
//! sealed and are written back byte-for-byte.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NoteLockError, Result};
use crate::model::Note;

/// On-disk format version of [`JsonFileStore`].
pub const STORE_VERSION: u32 = 1;

/// Load and save the whole note list.
pub trait NoteStore: Send + Sync {
    /// Load every note. A store that was never written loads as empty.
    fn load(&self) -> Result<Vec<Note>>;

    /// Replace the stored list with `notes`.
    fn save_all(&self, notes: &[Note]) -> Result<()>;
}

/// Volatile store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: Mutex<Vec<Note>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: Mutex::new(notes),
        }
    }
}

impl NoteStore for MemoryStore {
    fn load(&self) -> Result<Vec<Note>> {
        Ok(self.notes.lock().clone())
    }

    fn save_all(&self, notes: &[Note]) -> Result<()> {
        *self.notes.lock() = notes.to_vec();
        Ok(())
    }
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    version: u32,
    notes: &'a [Note],
}

#[derive(Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    notes: Vec<Note>,
}

/// Notes kept in one JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NoteStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Note>> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no notes file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let file: StoreFile = serde_json::from_slice(&data)?;
        if file.version != STORE_VERSION {
            return Err(NoteLockError::Storage(format!(
                "Unsupported notes file version {} (expected {})",
                file.version, STORE_VERSION
            )));
        }
        debug!(count = file.notes.len(), "notes loaded");
        Ok(file.notes)
    }

    fn save_all(&self, notes: &[Note]) -> Result<()> {
        let data = serde_json::to_vec_pretty(&StoreFileRef {
            version: STORE_VERSION,
            notes,
        })?;
        crate::fs::write_atomic(&self.path, &data)?;
        debug!(count = notes.len(), "notes saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{CipherEngineExt, FakeCipher};
    use crate::model::{Block, NoteBody, NoteKind};
    use tempfile::tempdir;

    fn sample() -> Vec<Note> {
        let cipher = FakeCipher::new();
        let mut plain = Note::new(NoteKind::Checklist);
        plain.title = "Groceries".into();
        plain.body = NoteBody::Plain(vec![Block::todo("milk", false)]);

        let mut locked = Note::new(NoteKind::Text);
        locked.body = NoteBody::Sealed(cipher.seal(&vec![Block::text("secret")], "4444").unwrap());
        vec![plain, locked]
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("notes.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("notes.json"));
        let notes = sample();

        store.save_all(&notes).unwrap();
        assert_eq!(store.load().unwrap(), notes);
    }

    #[test]
    fn test_locked_note_has_no_plaintext_on_disk() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("notes.json"));
        store.save_all(&sample()).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("secret"));
        assert!(raw.contains("encryptedContent"));
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, r#"{"version":9,"notes":[]}"#).unwrap();

        let err = JsonFileStore::new(path).load().unwrap_err();
        assert!(matches!(err, NoteLockError::Storage(_)));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.save_all(&sample()).unwrap();
        assert_eq!(store.load().unwrap().len(), 2);
    }
}
