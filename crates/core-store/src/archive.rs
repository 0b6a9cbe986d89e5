//! Archive export/import and Markdown export.

use crate::{Note, Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ARCHIVE_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Archive {
    notes: Vec<Note>,
    exported_at: DateTime<Utc>,
    version: String,
}

/// Serialize notes into a self-describing JSON archive.
pub fn export_archive(notes: &[Note]) -> Result<String> {
    let archive = Archive {
        notes: notes.to_vec(),
        exported_at: Utc::now(),
        version: ARCHIVE_VERSION.to_string(),
    };
    Ok(serde_json::to_string_pretty(&archive)?)
}

/// Parse an archive produced by [`export_archive`]. The caller decides how to
/// merge the result (see `LocalStore::adopt`).
pub fn import_archive(raw: &str) -> Result<Vec<Note>> {
    let archive: Archive = serde_json::from_str(raw)
        .map_err(|e| StoreError::InvalidArchive(e.to_string()))?;
    Ok(archive.notes)
}

/// One note as a standalone Markdown document: title, blank line, content.
pub fn to_markdown(note: &Note) -> String {
    if note.title.is_empty() {
        note.content.clone()
    } else {
        format!("{}\n\n{}", note.title, note.content)
    }
}
