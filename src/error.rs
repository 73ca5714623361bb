//! Error taxonomy for the chunking pipeline
//!
//! Setup errors ([`ScanError`], [`ConfigError`]) abort a run. Per-task
//! errors ([`TaskError`]) are recorded in that task's result and never
//! reach sibling tasks. Per-chunk [`WriteError`]s are only logged and counted.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The input root could not be opened
#[derive(Debug, Error)]
#[error("cannot read input directory {}: {source}", path.display())]
pub struct ScanError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Invalid pipeline configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },

    #[error("at least one file extension must be accepted")]
    NoExtensions,
}

/// Failure of the text extraction collaborator
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("error extracting text from page {page}: {message}")]
    Page { page: usize, message: String },

    #[error("extraction timed out after {}", humantime::format_duration(*.0))]
    Timeout(Duration),

    #[error("extractor panicked: {0}")]
    Panicked(String),
}

/// Per-task failure, carried in that task's result
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("worker panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TaskError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A single chunk file could not be written
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Render a panic payload as text
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
