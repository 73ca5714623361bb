//! Scanner - Recursive directory walk producing one task per source file
//!
//! Entries are sorted by file name within each directory, so a given tree
//! always enumerates in the same order. Unreadable entries are logged and
//! skipped; only an unreadable root is fatal. Two sources that map to the
//! same chunk directory (`a.pdf` next to `a.txt`) are both kept, with a
//! warning: their chunk files land in one directory.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crossbeam_channel::Sender;
use walkdir::{DirEntry, WalkDir};

use super::{CancellationFlag, Task};
use crate::error::ScanError;

/// Scanner configuration options
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Input root
    pub source: PathBuf,
    /// Accepted extensions, compared case-insensitively (leading dot optional)
    pub extensions: Vec<String>,
    /// Skip hidden files and directories
    pub skip_hidden: bool,
    /// Maximum traversal depth
    pub max_depth: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            source: PathBuf::from("pdfs"),
            extensions: vec!["pdf".to_string(), "txt".to_string()],
            skip_hidden: true,
            max_depth: None,
        }
    }
}

/// Directory scanner
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Fail early if the root cannot be opened
    pub fn check_root(&self) -> Result<(), ScanError> {
        fs::read_dir(&self.options.source)
            .map(|_| ())
            .map_err(|source| ScanError {
                path: self.options.source.clone(),
                source,
            })
    }

    /// Collect every matching task
    pub fn scan(&self) -> Result<Vec<Task>, ScanError> {
        self.check_root()?;
        Ok(self.walk().collect())
    }

    /// Stream tasks into `tx` until the walk ends, the receiver hangs up,
    /// or `cancel` is raised. Returns the number of tasks sent.
    pub fn scan_into(&self, tx: &Sender<Task>, cancel: &CancellationFlag) -> Result<usize, ScanError> {
        self.check_root()?;

        let mut sent = 0;
        for task in self.walk() {
            if cancel.is_cancelled() {
                tracing::info!("Scan cancelled after {} tasks", sent);
                break;
            }
            if tx.send(task).is_err() {
                tracing::warn!("Task queue closed, stopping scan");
                break;
            }
            sent += 1;
        }

        Ok(sent)
    }

    fn walk(&self) -> impl Iterator<Item = Task> + '_ {
        let options = &self.options;

        let mut stems = StemTracker::default();
        let mut walker = WalkDir::new(&options.source)
            .follow_links(false)
            .sort_by_file_name();
        if let Some(depth) = options.max_depth {
            walker = walker.max_depth(depth);
        }

        walker
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || !(options.skip_hidden && is_hidden(e)))
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter(move |e| self.matches_extensions(e))
            .map(move |e| {
                let path = e.path().to_path_buf();
                let relative = path
                    .strip_prefix(&options.source)
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|_| PathBuf::from(e.file_name()));
                Task::new(path, relative)
            })
            .inspect(move |task| {
                if let Some(first) = stems.record(task) {
                    tracing::warn!(
                        "{} and {} share chunk directory {}",
                        first,
                        task.display_name,
                        task.output_stem().display()
                    );
                }
            })
    }

    fn matches_extensions(&self, entry: &DirEntry) -> bool {
        entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                self.options
                    .extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

/// Remembers which source claimed each output stem
#[derive(Debug, Default)]
struct StemTracker {
    owners: HashMap<PathBuf, String>,
}

impl StemTracker {
    /// Returns the earlier source's name if `task`'s stem is already taken
    fn record(&mut self, task: &Task) -> Option<String> {
        match self.owners.get(&task.output_stem()) {
            Some(first) => Some(first.clone()),
            None => {
                self.owners
                    .insert(task.output_stem(), task.display_name.clone());
                None
            }
        }
    }
}

/// Check if entry is hidden (starts with .)
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn create_tree(base: &Path) {
        std::fs::create_dir_all(base.join("solar/thin-film")).unwrap();
        std::fs::create_dir_all(base.join(".cache")).unwrap();
        std::fs::write(base.join("b.pdf"), "pdf").unwrap();
        std::fs::write(base.join("a.TXT"), "txt").unwrap();
        std::fs::write(base.join("image.png"), "png").unwrap();
        std::fs::write(base.join("solar/cell.pdf"), "pdf").unwrap();
        std::fs::write(base.join("solar/thin-film/notes.txt"), "txt").unwrap();
        std::fs::write(base.join(".cache/hidden.txt"), "txt").unwrap();
    }

    fn options(source: &Path) -> ScanOptions {
        ScanOptions {
            source: source.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_scanner_finds_matching_files() {
        let dir = tempdir().unwrap();
        create_tree(dir.path());

        let tasks = Scanner::new(options(dir.path())).scan().unwrap();
        let names: Vec<_> = tasks.iter().map(|t| t.relative.clone()).collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("a.TXT"),
                PathBuf::from("b.pdf"),
                PathBuf::from("solar/cell.pdf"),
                PathBuf::from("solar/thin-film/notes.txt"),
            ]
        );
    }

    #[test]
    fn test_scanner_includes_hidden_when_asked() {
        let dir = tempdir().unwrap();
        create_tree(dir.path());

        let opts = ScanOptions {
            skip_hidden: false,
            ..options(dir.path())
        };
        let tasks = Scanner::new(opts).scan().unwrap();
        assert_eq!(tasks.len(), 5);
    }

    #[test]
    fn test_scanner_with_extension_filter() {
        let dir = tempdir().unwrap();
        create_tree(dir.path());

        let opts = ScanOptions {
            extensions: vec![".PNG".to_string()],
            ..options(dir.path())
        };
        let tasks = Scanner::new(opts).scan().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].display_name, "image.png");
    }

    #[test]
    fn test_scanner_is_deterministic() {
        let dir = tempdir().unwrap();
        create_tree(dir.path());

        let scanner = Scanner::new(options(dir.path()));
        assert_eq!(scanner.scan().unwrap(), scanner.scan().unwrap());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let scanner = Scanner::new(options(&dir.path().join("missing")));
        let err = scanner.scan().unwrap_err();
        assert!(err.path.ends_with("missing"));
    }

    #[test]
    fn test_shared_stem_keeps_both_sources() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), "pdf").unwrap();
        std::fs::write(dir.path().join("a.txt"), "txt").unwrap();

        let tasks = Scanner::new(options(dir.path())).scan().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].output_stem(), tasks[1].output_stem());
    }

    #[test]
    fn test_stem_tracker_reports_first_owner() {
        let task = |rel: &str| Task::new(PathBuf::from(rel), PathBuf::from(rel));
        let mut stems = StemTracker::default();

        assert_eq!(stems.record(&task("solar/a.pdf")), None);
        assert_eq!(stems.record(&task("wind/a.pdf")), None);
        assert_eq!(
            stems.record(&task("solar/a.txt")),
            Some("solar/a.pdf".to_string())
        );
        assert_eq!(
            stems.record(&task("solar/a.md")),
            Some("solar/a.pdf".to_string())
        );
    }

    #[test]
    fn test_scan_into_respects_cancellation() {
        let dir = tempdir().unwrap();
        create_tree(dir.path());

        let (tx, rx) = crossbeam_channel::unbounded();
        let cancel = CancellationFlag::new();
        cancel.cancel();

        let sent = Scanner::new(options(dir.path()))
            .scan_into(&tx, &cancel)
            .unwrap();
        assert_eq!(sent, 0);
        assert!(rx.try_recv().is_err());
    }
}
