//! CLI module - Command line interface definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;

/// docchunk - Split PDFs and text files into overlapping chunks
///
/// Walks an input tree, extracts text page by page and writes fixed-size,
/// overlapping windows as numbered files under an output tree that mirrors
/// the input layout.
#[derive(Parser, Debug)]
#[command(name = "docchunk")]
#[command(version)]
#[command(about = "Split PDFs and text files into overlapping text chunks", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chunk every PDF/text file under the input directory
    Chunk(ChunkArgs),

    /// Strip markdown-like delimiters from chunk files in place
    Clean(CleanArgs),

    /// Prefix PDFs with a running number (001_, 002_, ...)
    Number(NumberArgs),

    /// Show or create the config file
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct ChunkArgs {
    /// Input directory (overrides config)
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Bytes per chunk
    #[arg(long, short = 's')]
    pub chunk_size: Option<usize>,

    /// Bytes shared between neighbouring chunks
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Number of parallel workers (default: CPU count)
    #[arg(long, short)]
    pub workers: Option<usize>,

    /// File extensions to include (e.g., pdf,txt)
    #[arg(long, short = 'e', value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// PDF extraction timeout, e.g. "20s" or "2m" ("0s" = never)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<std::time::Duration>,

    /// Include hidden files and directories
    #[arg(long)]
    pub include_hidden: bool,

    /// Summary format
    #[arg(long, value_enum, default_value = "human")]
    pub report: ReportFormat,
}

impl ChunkArgs {
    /// Layer command-line overrides on top of the loaded config
    pub fn apply_to(&self, config: &mut Config) {
        let chunk = &mut config.chunk;
        if let Some(ref input) = self.input {
            chunk.input = input.clone();
        }
        if let Some(ref output) = self.output {
            chunk.output = output.clone();
        }
        if let Some(size) = self.chunk_size {
            chunk.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            chunk.chunk_overlap = overlap;
        }
        if let Some(workers) = self.workers {
            chunk.workers = workers;
        }
        if let Some(ref exts) = self.extensions {
            chunk.extensions = exts.clone();
        }
        if let Some(timeout) = self.timeout {
            chunk.extract_timeout = timeout;
        }
        if self.include_hidden {
            chunk.skip_hidden = false;
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct CleanArgs {
    /// Directory to clean (default: config clean.root)
    pub dir: Option<PathBuf>,

    /// Report changes without rewriting files
    #[arg(long)]
    pub dry_run: bool,

    /// Summary format
    #[arg(long, value_enum, default_value = "human")]
    pub report: ReportFormat,
}

#[derive(Debug, Clone, Parser)]
pub struct NumberArgs {
    /// Directory holding the PDFs (default: config chunk.input)
    pub dir: Option<PathBuf>,

    /// Print the planned renames without applying them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct ConfigArgs {
    /// Write a commented sample config if none exists
    #[arg(long)]
    pub init: bool,

    /// Only print the config file location
    #[arg(long)]
    pub path: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human readable (default)
    Human,
    /// JSON output
    Json,
}
