//! Worker Pool - fixed set of threads sharing one bounded task queue
//!
//! A worker owns its task end to end: it picks the processing mode,
//! feeds extracted text through a [`ChunkWindow`], hands chunks to a
//! per-task [`ChunkWriter`] and reports exactly one [`TaskResult`].
//! Because one thread produces all of a task's chunks in sequence, chunk
//! indices reach the writer in order without further coordination.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

use super::chunker::{ChunkWindow, WindowOptions};
use super::extract::TextExtractor;
use super::writer::ChunkWriter;
use super::{CancellationFlag, SourceKind, Task, TaskResult};
use crate::error::{panic_message, TaskError};

/// Everything a worker needs besides the task itself
pub struct WorkerContext {
    pub output_root: PathBuf,
    pub window: WindowOptions,
    pub extractor: Arc<dyn TextExtractor>,
}

/// Running pool of worker threads
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` threads. The pool's result senders close once every
    /// worker has exited, which ends the collector's stream.
    pub fn spawn(
        workers: usize,
        tasks: Receiver<Task>,
        results: Sender<TaskResult>,
        context: Arc<WorkerContext>,
        cancel: CancellationFlag,
    ) -> std::io::Result<Self> {
        let mut handles = Vec::with_capacity(workers);

        for worker_id in 0..workers.max(1) {
            let tasks = tasks.clone();
            let results = results.clone();
            let context = Arc::clone(&context);
            let cancel = cancel.clone();

            let handle = thread::Builder::new()
                .name(format!("chunk-worker-{}", worker_id))
                .spawn(move || worker_loop(worker_id, tasks, results, &context, &cancel))?;
            handles.push(handle);
        }

        Ok(Self { handles })
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to exit
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked outside a task");
            }
        }
    }
}

fn worker_loop(
    worker_id: usize,
    tasks: Receiver<Task>,
    results: Sender<TaskResult>,
    context: &WorkerContext,
    cancel: &CancellationFlag,
) {
    for task in tasks.iter() {
        if cancel.is_cancelled() {
            debug!(worker_id, "Cancellation requested, leaving {} unprocessed", task.display_name);
            break;
        }

        debug!(worker_id, "Processing {}", task.display_name);
        let result = process_guarded(&task, context);

        if results.send(result).is_err() {
            break;
        }
    }

    debug!(worker_id, "Worker exiting");
}

/// Run one task, turning a panic into that task's error
fn process_guarded(task: &Task, context: &WorkerContext) -> TaskResult {
    match panic::catch_unwind(AssertUnwindSafe(|| process_task(task, context))) {
        Ok(result) => result,
        Err(payload) => TaskResult {
            name: task.display_name.clone(),
            chunks_written: 0,
            write_failures: 0,
            error: Some(TaskError::Panicked(panic_message(payload.as_ref()))),
        },
    }
}

/// Extract, chunk and write one source file
pub fn process_task(task: &Task, context: &WorkerContext) -> TaskResult {
    let mut result = TaskResult {
        name: task.display_name.clone(),
        chunks_written: 0,
        write_failures: 0,
        error: None,
    };

    let kind = task.kind();
    if kind == SourceKind::Unsupported {
        let ext = task
            .source_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        result.error = Some(TaskError::UnsupportedType(ext));
        return result;
    }

    let chunk_dir = task.chunk_dir(&context.output_root);
    if let Err(e) = fs::create_dir_all(&chunk_dir) {
        result.error = Some(TaskError::io(chunk_dir, e));
        return result;
    }

    let mut writer = match ChunkWriter::spawn(chunk_dir.clone()) {
        Ok(writer) => writer,
        Err(e) => {
            result.error = Some(TaskError::io(chunk_dir, e));
            return result;
        }
    };

    let outcome = feed_chunks(task, kind, context, &mut writer);
    let stats = writer.finish();

    result.chunks_written = stats.written;
    result.write_failures = stats.failed;
    result.error = outcome.err();

    if result.is_success() {
        debug!("Chunked {} into {} chunks", task.display_name, stats.written);
    }
    result
}

/// Push the task's text through the window. Chunks sent before an error stay on disk.
fn feed_chunks(
    task: &Task,
    kind: SourceKind,
    context: &WorkerContext,
    writer: &mut ChunkWriter,
) -> Result<(), TaskError> {
    let mut window = ChunkWindow::new(context.window);

    match kind {
        SourceKind::Pdf => {
            let pages = context.extractor.pages(&task.source_path)?;
            for page in pages {
                for chunk in window.push(&page?) {
                    writer.send(chunk);
                }
            }
        }
        SourceKind::Text => {
            let bytes = fs::read(&task.source_path)
                .map_err(|e| TaskError::io(task.source_path.clone(), e))?;
            for chunk in window.push(&bytes) {
                writer.send(chunk);
            }
        }
        // rejected in process_task before the chunk dir exists
        SourceKind::Unsupported => return Ok(()),
    }

    for chunk in window.finish() {
        writer.send(chunk);
    }
    Ok(())
}
