//! Core module - The chunking pipeline
//!
//! Scanner -> task queue -> worker pool -> per-file chunk writer ->
//! result queue -> collector.

mod chunker;
mod collector;
mod engine;
mod extract;
mod pool;
mod scanner;
mod writer;

pub use chunker::{chunk_text, ChunkWindow, WindowOptions};
pub use collector::{Collector, RunSummary, TaskFailure};
pub use engine::{ChunkPipeline, PipelineOptions};
pub use extract::{PageIter, PdfExtractor, TextExtractor};
pub use pool::{process_task, WorkerContext, WorkerPool};
pub use scanner::{ScanOptions, Scanner};
pub use writer::{chunk_file_name, ChunkWriter, WriterStats};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::TaskError;

/// Processing mode, decided from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Pdf,
    Text,
    Unsupported,
}

impl SourceKind {
    /// Determine processing mode from extension (case-insensitive, leading dot allowed)
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => SourceKind::Pdf,
            "txt" | "text" => SourceKind::Text,
            _ => SourceKind::Unsupported,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(SourceKind::Unsupported)
    }
}

/// One source file to be processed end-to-end by a single worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Absolute or root-joined path of the source file
    pub source_path: PathBuf,
    /// Path relative to the input root, used for the output layout
    pub relative: PathBuf,
    /// Human-readable name reported in results
    pub display_name: String,
}

impl Task {
    pub fn new(source_path: PathBuf, relative: PathBuf) -> Self {
        let display_name = relative.to_string_lossy().to_string();
        Self {
            source_path,
            relative,
            display_name,
        }
    }

    pub fn kind(&self) -> SourceKind {
        SourceKind::from_path(&self.source_path)
    }

    /// Output directory for this task's chunks: the relative path minus its extension
    pub fn chunk_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(self.output_stem())
    }

    /// Relative path minus extension; `a.pdf` and `a.txt` share one
    pub fn output_stem(&self) -> PathBuf {
        self.relative.with_extension("")
    }
}

/// A window of extracted text, as raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub bytes: Vec<u8>,
}

/// Outcome of a single task, produced exactly once
#[derive(Debug)]
pub struct TaskResult {
    pub name: String,
    pub chunks_written: usize,
    pub write_failures: usize,
    pub error: Option<TaskError>,
}

impl TaskResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Cooperative cancellation signal shared by the scanner, workers and caller
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
