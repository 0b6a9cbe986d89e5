//! In-memory store, used by tests and as the fallback when no data file is
//! configured.

use crate::{search, Note, NoteDraft, NoteId, NotePatch, NoteStore, Result, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: Vec<Note>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: &NoteId) -> Result<usize> {
        self.notes
            .iter()
            .position(|n| &n.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

impl NoteStore for MemoryStore {
    fn create_note(&mut self, draft: NoteDraft) -> Result<Note> {
        let note = Note::from_draft(draft);
        self.notes.push(note.clone());
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
        Ok(self.notes[idx].clone())
    }

    fn delete_note(&mut self, id: &NoteId) -> Result<()> {
        let idx = self.position(id)?;
        self.notes.remove(idx);
        Ok(())
    }

    fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        Ok(search(&self.notes, query))
    }
}
