//! docchunk Library
//!
//! Splits a tree of PDFs and text files into fixed-size, overlapping text
//! chunks written one file per chunk.
//!
//! # Features
//!
//! - **Bounded pipeline**: scanner, worker pool and per-file writer threads
//!   joined by bounded crossbeam channels
//! - **Streaming chunker**: pages are windowed as they are extracted
//! - **Fault isolation**: a broken or hanging PDF fails its own task only
//! - **Cooperative cancellation**: in-flight files finish, nothing new starts
//!
//! # Example
//!
//! ```no_run
//! use docchunk::core::{ChunkPipeline, PipelineOptions};
//! use std::path::PathBuf;
//!
//! fn main() -> anyhow::Result<()> {
//!     let pipeline = ChunkPipeline::new(PipelineOptions {
//!         input: PathBuf::from("pdfs"),
//!         output: PathBuf::from("chunks"),
//!         ..Default::default()
//!     })?;
//!
//!     let summary = pipeline.run()?;
//!     println!("{} chunks from {} files", summary.chunks_written, summary.total);
//!     Ok(())
//! }
//! ```

pub mod clean;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod numbering;
pub mod output;

// Re-export commonly used types
pub use clean::{clean_directory, clean_text, CleanOptions, CleanReport};
pub use config::Config;
pub use core::{
    chunk_text, CancellationFlag, Chunk, ChunkPipeline, PipelineOptions, RunSummary, Task,
    TaskResult, TextExtractor, WindowOptions,
};
pub use error::{ConfigError, ExtractionError, ScanError, TaskError, WriteError};
pub use numbering::{number_pdfs, plan_renames, NumberingReport};
