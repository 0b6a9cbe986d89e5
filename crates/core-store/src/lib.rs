//! Note persistence: the data model, the [`NoteStore`] trait and its two
//! implementations (in-memory and single-file JSON).
//!
//! Store failures never touch the caller's editing buffer; they surface as
//! [`StoreError`] and the in-memory note text stays whatever it was.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

mod archive;
mod error;
mod local;
mod memory;

pub use archive::{export_archive, import_archive, to_markdown};
pub use error::{Result, StoreError};
pub use local::LocalStore;
pub use memory::MemoryStore;

/// Number of preview characters kept per note in list views.
pub const PREVIEW_LEN: usize = 150;

/// Opaque note identifier. Freshly created notes get a v4 UUID; imported
/// notes keep whatever identifier they carried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Markdown-stripped excerpt, recomputed on every content change.
    pub preview: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Fields for a new note; everything defaults to empty.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// CRUD plus search over notes.
///
/// `all_notes` and `search_notes` return owned snapshots; the store keeps no
/// cursor state between calls.
pub trait NoteStore {
    fn create_note(&mut self, draft: NoteDraft) -> Result<Note>;
    fn get_note(&self, id: &NoteId) -> Result<Note>;
    /// All notes, most recently updated first.
    fn all_notes(&self) -> Result<Vec<Note>>;
    fn update_note(&mut self, id: &NoteId, patch: NotePatch) -> Result<Note>;
    fn delete_note(&mut self, id: &NoteId) -> Result<()>;
    /// Case-insensitive substring match over title, content and tags. A blank
    /// query matches everything.
    fn search_notes(&self, query: &str) -> Result<Vec<Note>>;
}

fn hashtag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#(\w+)").expect("hashtag pattern"))
}

/// Distinct `#tag` names appearing in `content`, in first-seen order.
pub fn extract_tags(content: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for c in hashtag_re().captures_iter(content) {
        let tag = c[1].to_string();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

impl Note {
    pub(crate) fn from_draft(draft: NoteDraft) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::generate(),
            preview: core_style::plain_preview(&draft.content, PREVIEW_LEN),
            title: draft.title,
            content: draft.content,
            created_at: now,
            updated_at: now,
            tags: draft.tags,
        }
    }

    pub(crate) fn apply(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.preview = core_style::plain_preview(&content, PREVIEW_LEN);
            self.content = content;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        self.updated_at = Utc::now();
    }

    pub(crate) fn matches(&self, term: &str) -> bool {
        self.title.to_lowercase().contains(term)
            || self.content.to_lowercase().contains(term)
            || self.tags.iter().any(|t| t.to_lowercase().contains(term))
    }
}

/// Shared search/sort over a note slice.
pub(crate) fn search(notes: &[Note], query: &str) -> Vec<Note> {
    let term = query.trim().to_lowercase();
    let mut hits: Vec<Note> = if term.is_empty() {
        notes.to_vec()
    } else {
        notes.iter().filter(|n| n.matches(&term)).cloned().collect()
    };
    hits.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    hits
}
