//! File-backed store: the whole collection lives in one JSON document and is
//! rewritten after every mutation (last write wins, single device).

use crate::{search, Note, NoteDraft, NoteId, NotePatch, NoteStore, Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataFile {
    #[serde(default)]
    notes: Vec<Note>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    notes: Vec<Note>,
}

impl LocalStore {
    /// Open the store at `path`, creating an empty one if the file does not
    /// exist. An unreadable file is an error; silently starting empty over a
    /// corrupt file would lose the user's notes on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let notes = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let data: DataFile = serde_json::from_str(&raw)?;
            debug!(target: "store.local", path = %path.display(), notes = data.notes.len(), "opened");
            data.notes
        } else {
            info!(target: "store.local", path = %path.display(), "no data file, starting empty");
            Vec::new()
        };
        Ok(Self { path, notes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = DataFile {
            notes: self.notes.clone(),
            last_updated: Some(Utc::now()),
        };
        let raw = serde_json::to_string_pretty(&data)?;
        fs::write(&self.path, raw)?;
        debug!(target: "store.local", notes = self.notes.len(), "persisted");
        Ok(())
    }

    fn position(&self, id: &NoteId) -> Result<usize> {
        self.notes
            .iter()
            .position(|n| &n.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Adopt notes from an archive, skipping identifiers already present.
    /// Returns how many were added.
    pub fn adopt(&mut self, incoming: Vec<Note>) -> Result<usize> {
        let before = self.notes.len();
        for note in incoming {
            if self.position(&note.id).is_err() {
                self.notes.push(note);
            } else {
                warn!(target: "store.local", id = %note.id, "skipping duplicate on import");
            }
        }
        let added = self.notes.len() - before;
        if added > 0 {
            self.persist()?;
        }
        Ok(added)
    }
}

impl NoteStore for LocalStore {
    fn create_note(&mut self, draft: NoteDraft) -> Result<Note> {
        let note = Note::from_draft(draft);
        self.notes.push(note.clone());
        self.persist()?;
        Ok(note)
    }

    fn get_note(&self, id: &NoteId) -> Result<Note> {
        Ok(self.notes[self.position(id)?].clone())
    }

    fn all_notes(&self) -> Result<Vec<Note>> {
        Ok(search(&self.notes, ""))
    }

    fn update_note(&mut self, id: &NoteId, patch: NotePatch) -> Result<Note> {
        let idx = self.position(id)?;
        self.notes[idx].apply(patch);
        self.persist()?;
        Ok(self.notes[idx].clone())
    }

    fn delete_note(&mut self, id: &NoteId) -> Result<()> {
        let idx = self.position(id)?;
        self.notes.remove(idx);
        self.persist()
    }

    fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        Ok(search(&self.notes, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("notes.json")
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        let id = {
            let mut store = LocalStore::open(&path).unwrap();
            let note = store
                .create_note(NoteDraft {
                    title: "persisted".into(),
                    content: "# body".into(),
                    tags: vec![],
                })
                .unwrap();
            note.id
        };

        let store = LocalStore::open(&path).unwrap();
        let note = store.get_note(&id).unwrap();
        assert_eq!(note.title, "persisted");
        assert_eq!(note.preview, "body");
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(store_path(&dir)).unwrap();
        assert!(store.all_notes().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_wipe() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            LocalStore::open(&path),
            Err(StoreError::Serialization(_))
        ));
        // The broken file is untouched.
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn delete_missing_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(store_path(&dir)).unwrap();
        assert!(matches!(
            store.delete_note(&NoteId::from("ghost")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn adopt_skips_existing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(store_path(&dir)).unwrap();
        let existing = store.create_note(NoteDraft::default()).unwrap();

        let fresh = Note::from_draft(NoteDraft {
            title: "imported".into(),
            ..Default::default()
        });
        let added = store.adopt(vec![existing.clone(), fresh.clone()]).unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.all_notes().unwrap().len(), 2);
    }
}
