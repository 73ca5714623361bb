//! Chunk cleaning - strip markdown-like delimiters from text files in place
//!
//! Walks a directory, rewrites every `.txt` file with the configured
//! delimiter characters removed. Files are independent, so they are
//! processed in parallel with rayon.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

/// Delimiters removed by default
pub const DEFAULT_DELIMITERS: &[&str] = &[
    ",", "*", "#", "[", "]", "(", ")", "{", "}", "`", "~", "^", "=", "|",
];

/// Options for a cleaning pass
#[derive(Debug, Clone)]
pub struct CleanOptions {
    pub root: PathBuf,
    pub delimiters: Vec<String>,
    /// Report what would change without rewriting anything
    pub dry_run: bool,
}

impl CleanOptions {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            delimiters: DEFAULT_DELIMITERS.iter().map(|d| d.to_string()).collect(),
            dry_run: false,
        }
    }
}

/// Outcome of a cleaning pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanReport {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub characters_removed: usize,
    pub errors: Vec<String>,
}

/// Remove every delimiter from `input`
pub fn clean_text(input: &str, delimiters: &[String]) -> String {
    let mut cleaned = input.to_string();
    for delim in delimiters.iter().filter(|d| !d.is_empty()) {
        cleaned = cleaned.replace(delim.as_str(), "");
    }
    cleaned
}

/// Clean every `.txt` file under `options.root`
pub fn clean_directory(options: &CleanOptions) -> Result<CleanReport> {
    fs::read_dir(&options.root)
        .with_context(|| format!("Failed to read directory: {}", options.root.display()))?;

    let files: Vec<PathBuf> = WalkDir::new(&options.root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("txt"))
        .map(|e| e.path().to_path_buf())
        .collect();

    let outcomes: Vec<Result<Option<usize>>> = files
        .par_iter()
        .map(|path| clean_file(path, options))
        .collect();

    let mut report = CleanReport {
        files_scanned: files.len(),
        ..Default::default()
    };
    for outcome in outcomes {
        match outcome {
            Ok(Some(removed)) => {
                report.files_changed += 1;
                report.characters_removed += removed;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("{:#}", e);
                report.errors.push(format!("{:#}", e));
            }
        }
    }

    Ok(report)
}

/// Returns the number of removed characters if the file changed
fn clean_file(path: &Path, options: &CleanOptions) -> Result<Option<usize>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file {}", path.display()))?;

    let cleaned = clean_text(&content, &options.delimiters);
    if cleaned == content {
        return Ok(None);
    }

    let removed = content.chars().count() - cleaned.chars().count();
    if !options.dry_run {
        fs::write(path, cleaned.as_bytes())
            .with_context(|| format!("Failed to write cleaned content to {}", path.display()))?;
        tracing::info!("Cleaned: {}", path.display());
    }

    Ok(Some(removed))
}
