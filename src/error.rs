// error.rs - Error taxonomy for parsing, editing, and persistence

use crate::entry::EntryKind;
use std::path::PathBuf;

/// The manifest text could not be interpreted as a document.
#[derive(Debug, thiserror::Error)]
#[error("invalid manifest: {message}")]
pub struct ParseError {
    pub message: String,
}

/// The in-memory document could not be rendered to text.
#[derive(Debug, thiserror::Error)]
#[error("cannot serialize manifest: {message}")]
pub struct SerializationError {
    pub message: String,
}

/// Failures of an edit session against the current document.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditError {
    #[error("{kind} entry #{index} is stale; the manifest changed since it was listed")]
    EntryStale { kind: EntryKind, index: usize },
    #[error("{kind} #{index} no longer exists (manifest has {len})")]
    IndexOutOfRange {
        kind: EntryKind,
        index: usize,
        len: usize,
    },
    #[error("{kind} has no field named '{label}'")]
    UnknownField { kind: EntryKind, label: String },
}

/// Startup or reload failed to produce a document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// One stage of the save cycle failed. Later stages never ran.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("save aborted, file untouched: {0}")]
    Serialize(#[from] SerializationError),
    #[error("write to {path} failed: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} was written but could not be read back: {source}")]
    ReadBack {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} was written but does not parse back: {source}")]
    Reparse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl SaveError {
    /// Whether the file on disk may already hold the new content.
    pub fn file_overwritten(&self) -> bool {
        matches!(self, SaveError::ReadBack { .. } | SaveError::Reparse { .. })
    }
}
