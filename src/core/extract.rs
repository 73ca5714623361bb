//! Text extraction collaborators
//!
//! PDFs go through `pdf-extract`, page by page, on a helper thread so a
//! document that hangs the parser can be abandoned after a timeout.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;

use crate::error::{panic_message, ExtractionError};

/// Lazily yielded page texts, in page order
pub type PageIter = Box<dyn Iterator<Item = Result<String, ExtractionError>> + Send>;

/// Capability: turn a document into plain text, one page at a time
pub trait TextExtractor: Send + Sync {
    /// Open the document. An `Err` item from the iterator aborts the task.
    fn pages(&self, path: &Path) -> Result<PageIter, ExtractionError>;
}

/// `pdf-extract` backed extractor
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    timeout: Option<Duration>,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(20)),
        }
    }
}

impl PdfExtractor {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl TextExtractor for PdfExtractor {
    fn pages(&self, path: &Path) -> Result<PageIter, ExtractionError> {
        let bytes = fs::read(path).map_err(|source| ExtractionError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let job = move || extract_pages(&bytes);
        let pages = match self.timeout {
            Some(timeout) => run_with_timeout(job, timeout)?,
            None => run_guarded(job)?,
        };

        tracing::debug!("Extracted {} pages from {}", pages.len(), path.display());
        Ok(Box::new(pages.into_iter().map(Ok)))
    }
}

fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractionError::Pdf(e.to_string()))
}

/// Run an extraction job, turning a panic into [`ExtractionError::Panicked`]
fn run_guarded<F>(job: F) -> Result<Vec<String>, ExtractionError>
where
    F: FnOnce() -> Result<Vec<String>, ExtractionError>,
{
    match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(result) => result,
        Err(payload) => Err(ExtractionError::Panicked(panic_message(payload.as_ref()))),
    }
}

/// Run an extraction job on a detached thread. On timeout the thread is
/// left to finish on its own; its result is dropped.
fn run_with_timeout<F>(job: F, timeout: Duration) -> Result<Vec<String>, ExtractionError>
where
    F: FnOnce() -> Result<Vec<String>, ExtractionError> + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);

    thread::Builder::new()
        .name("pdf-extract".to_string())
        .spawn(move || {
            let _ = tx.send(run_guarded(job));
        })
        .map_err(|e| ExtractionError::Pdf(format!("failed to spawn extractor thread: {}", e)))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(ExtractionError::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => Err(ExtractionError::Panicked(
            "extractor thread exited without a result".to_string(),
        )),
    }
}
