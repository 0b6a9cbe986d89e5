//! Error types for note storage.

use crate::NoteId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("note not found: {0}")]
    NotFound(NoteId),

    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
