//! Editing session: one open note, its selection, and debounced autosave.
//!
//! The session is the explicit context object threaded between the UI
//! adapter, the mutation operations and the store. It owns the working copy
//! of the note text; the store is only told about it when the debounce timer
//! fires (or on an explicit flush). A store failure leaves the working copy
//! and the pending-save state untouched, so no user text is ever lost to a
//! failed write.

use core_edit::{dispatch, Command, Selection};
use core_store::{NoteDraft, NoteId, NotePatch, NoteStore, Result};
use core_style::StyledDocument;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

mod scheduler;

pub use scheduler::SaveScheduler;

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(750);

pub struct Session<S: NoteStore> {
    store: S,
    note_id: NoteId,
    title: String,
    buffer: String,
    selection: Selection,
    scheduler: SaveScheduler,
    dirty: bool,
}

impl<S: NoteStore> Session<S> {
    /// Open an existing note for editing.
    pub fn open(store: S, id: &NoteId, autosave_delay: Duration) -> Result<Self> {
        let note = store.get_note(id)?;
        Ok(Self {
            store,
            note_id: note.id,
            title: note.title,
            selection: Selection::caret(note.content.len()),
            buffer: note.content,
            scheduler: SaveScheduler::new(autosave_delay),
            dirty: false,
        })
    }

    /// Create a fresh note and open it.
    pub fn create(mut store: S, title: &str, autosave_delay: Duration) -> Result<Self> {
        let note = store.create_note(NoteDraft {
            title: title.to_string(),
            ..Default::default()
        })?;
        let id = note.id;
        Self::open(store, &id, autosave_delay)
    }

    pub fn note_id(&self) -> &NoteId {
        &self.note_id
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Adopt a selection from the UI layer. Offsets are clamped onto grapheme
    /// boundaries; adapters report positions in their own units and may hand
    /// us an offset inside a combining sequence.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = Selection::new(
            core_line::clamp_to_boundary(&self.buffer, selection.start),
            core_line::clamp_to_boundary(&self.buffer, selection.end),
        );
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Run one editing command against the buffer. Returns whether anything
    /// changed; a failed precondition is a silent no-op.
    pub fn apply(&mut self, command: &Command, now: Instant) -> bool {
        let Some(edit) = dispatch(&self.buffer, self.selection, command) else {
            return false;
        };
        self.buffer = edit.apply(&self.buffer);
        self.selection = edit.selection;
        self.touch(now);
        true
    }

    /// Insert literal text at the selection (replacing it), the way ordinary
    /// typing reaches the buffer.
    pub fn insert(&mut self, text: &str, now: Instant) {
        let Selection { start, end } = self.selection;
        self.buffer.replace_range(start..end, text);
        self.selection = Selection::caret(start + text.len());
        self.touch(now);
    }

    fn touch(&mut self, now: Instant) {
        self.dirty = true;
        self.scheduler.touch(now);
    }

    /// Styled rendering of the current buffer.
    pub fn render(&self) -> StyledDocument {
        core_style::render(&self.buffer)
    }

    /// Drive the autosave clock. Saves when an edit burst has gone quiet for
    /// the configured delay; returns whether a save happened.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        if self.dirty && self.scheduler.due(now) {
            self.save()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Persist now regardless of the timer (teardown, navigation away).
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let patch = NotePatch {
            content: Some(self.buffer.clone()),
            tags: Some(core_store::extract_tags(&self.buffer)),
            ..Default::default()
        };
        if let Err(e) = self.store.update_note(&self.note_id, patch) {
            // Buffer and pending state stay intact; the next tick retries.
            warn!(target: "session.save", error = %e, "save failed, keeping buffer");
            return Err(e);
        }
        debug!(target: "session.save", id = %self.note_id, bytes = self.buffer.len(), "saved");
        self.dirty = false;
        self.scheduler.clear();
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Give the store back, flushing first.
    pub fn close(mut self) -> Result<S> {
        self.flush()?;
        Ok(self.store)
    }
}
