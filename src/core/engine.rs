//! ChunkPipeline - wires scanner, worker pool, writers and collector
//!
//! ```text
//! scanner thread --tasks(2W)--> W workers --results(2W)--> collector (caller thread)
//!                                  |
//!                                  +--chunks(4)--> writer thread (one per task)
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::bounded;
use tracing::{info, warn};

use super::chunker::WindowOptions;
use super::collector::{Collector, RunSummary};
use super::extract::{PdfExtractor, TextExtractor};
use super::pool::{WorkerContext, WorkerPool};
use super::scanner::{ScanOptions, Scanner};
use super::{CancellationFlag, TaskResult};
use crate::error::ConfigError;

/// Everything a run needs, passed in at construction
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Input root, walked recursively
    pub input: PathBuf,
    /// Output root; one subdirectory per source file
    pub output: PathBuf,
    /// Window geometry
    pub window: WindowOptions,
    /// Worker threads (0 = CPU count)
    pub workers: usize,
    /// Accepted source extensions
    pub extensions: Vec<String>,
    /// Skip hidden files and directories
    pub skip_hidden: bool,
    /// Per-document PDF extraction timeout (None = wait forever)
    pub extract_timeout: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("pdfs"),
            output: PathBuf::from("chunks"),
            window: WindowOptions::default(),
            workers: 0,
            extensions: vec!["pdf".to_string(), "txt".to_string()],
            skip_hidden: true,
            extract_timeout: Some(Duration::from_secs(20)),
        }
    }
}

impl PipelineOptions {
    /// Resolved worker count
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }
        Ok(())
    }
}

/// The chunking pipeline
pub struct ChunkPipeline {
    options: PipelineOptions,
    extractor: Arc<dyn TextExtractor>,
    cancel: CancellationFlag,
}

impl ChunkPipeline {
    pub fn new(options: PipelineOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        let extractor = Arc::new(PdfExtractor::new(options.extract_timeout));
        Ok(Self {
            options,
            extractor,
            cancel: CancellationFlag::new(),
        })
    }

    /// Replace the PDF extraction collaborator
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Share an externally owned cancellation flag
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run to completion without a progress callback
    pub fn run(&self) -> Result<RunSummary> {
        self.run_with_progress(|_, _| {})
    }

    /// Run to completion, calling `on_result` as each task finishes.
    ///
    /// Only setup failures (output root not creatable, input root not
    /// readable) are returned as errors; per-task failures land in the summary.
    pub fn run_with_progress<F>(&self, on_result: F) -> Result<RunSummary>
    where
        F: FnMut(&TaskResult, &RunSummary),
    {
        let options = &self.options;
        let workers = options.effective_workers();

        fs::create_dir_all(&options.output).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                options.output.display()
            )
        })?;

        let scanner = Scanner::new(ScanOptions {
            source: options.input.clone(),
            extensions: options.extensions.clone(),
            skip_hidden: options.skip_hidden,
            max_depth: None,
        });
        scanner.check_root()?;

        info!(
            "Chunking {} -> {} ({} workers, size {}, overlap {})",
            options.input.display(),
            options.output.display(),
            workers,
            options.window.chunk_size(),
            options.window.chunk_overlap()
        );

        let (task_tx, task_rx) = bounded(workers * 2);
        let (result_tx, result_rx) = bounded::<TaskResult>(workers * 2);

        let context = Arc::new(WorkerContext {
            output_root: options.output.clone(),
            window: options.window,
            extractor: Arc::clone(&self.extractor),
        });

        let pool = WorkerPool::spawn(workers, task_rx, result_tx, context, self.cancel.clone())
            .context("Failed to spawn worker threads")?;

        let scan_handle = {
            let cancel = self.cancel.clone();
            thread::Builder::new()
                .name("chunk-scanner".to_string())
                .spawn(move || scanner.scan_into(&task_tx, &cancel))
                .context("Failed to spawn scanner thread")?
        };

        let mut collector = Collector::new();
        collector.drain(&result_rx, on_result);

        pool.join();
        match scan_handle.join() {
            Ok(Ok(sent)) => info!("Scanner queued {} tasks", sent),
            Ok(Err(e)) => warn!("Scanner stopped early: {}", e),
            Err(_) => warn!("Scanner thread panicked"),
        }

        let summary = collector.finish(self.cancel.is_cancelled());
        info!(
            "Run finished: {} ok, {} failed, {} chunks",
            summary.succeeded, summary.failed, summary.chunks_written
        );
        Ok(summary)
    }
}
