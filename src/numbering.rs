//! Source numbering - prefix PDFs with a stable running number
//!
//! PDFs anywhere under the root are ordered by lowercase file name, ties
//! broken by full path, and renamed in place to `NNN_<name>` (numbering
//! starts at 001). Each file stays in its own directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use walkdir::WalkDir;

/// One planned rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Outcome of a numbering pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct NumberingReport {
    pub renamed: Vec<Rename>,
    pub errors: Vec<String>,
}

/// Compute renames for every PDF under `root` without touching the filesystem
pub fn plan_renames(root: &Path) -> Result<Vec<Rename>> {
    let mut pdfs = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_pdf = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            pdfs.push(entry.into_path());
        }
    }

    pdfs.sort_by(|a, b| {
        lowercase_name(a)
            .cmp(&lowercase_name(b))
            .then_with(|| a.cmp(b))
    });

    Ok(pdfs
        .into_iter()
        .enumerate()
        .map(|(i, from)| {
            let name = from
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let to = from.with_file_name(format!("{:03}_{}", i + 1, name));
            Rename { from, to }
        })
        .collect())
}

/// Apply renames; a failed rename is reported and the rest continue
pub fn number_pdfs(root: &Path, dry_run: bool) -> Result<NumberingReport> {
    let plan = plan_renames(root)?;
    let mut report = NumberingReport::default();

    for rename in plan {
        if dry_run {
            report.renamed.push(rename);
            continue;
        }
        match fs::rename(&rename.from, &rename.to) {
            Ok(()) => {
                tracing::info!(
                    "Renamed {} -> {}",
                    rename.from.display(),
                    rename.to.display()
                );
                report.renamed.push(rename);
            }
            Err(e) => {
                let msg = format!("{}: {}", rename.from.display(), e);
                tracing::warn!("Rename failed: {}", msg);
                report.errors.push(msg);
            }
        }
    }

    Ok(report)
}

fn lowercase_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
