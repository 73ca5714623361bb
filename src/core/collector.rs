//! Result Collector - tallies per-task outcomes as they stream in
//!
//! Results arrive in completion order, which differs from scan order
//! whenever more than one worker runs. Nothing here depends on ordering.

use std::time::Instant;

use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::TaskResult;

/// A task that ended with an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub name: String,
    pub error: String,
}

/// Final (or partial, when cancelled) report of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub chunks_written: usize,
    pub write_failures: usize,
    pub cancelled: bool,
    pub failures: Vec<TaskFailure>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RunSummary {
    fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            chunks_written: 0,
            write_failures: 0,
            cancelled: false,
            failures: Vec::new(),
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.write_failures == 0
    }

    /// Multi-line report for terminal output
    pub fn to_human_string(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Processed {} files in {}\n",
            self.total,
            humantime::format_duration(std::time::Duration::from_millis(self.duration_ms))
        ));
        out.push_str(&format!("  Succeeded: {}\n", self.succeeded));
        out.push_str(&format!("  Failed: {}\n", self.failed));
        out.push_str(&format!("  Chunks written: {}\n", self.chunks_written));
        if self.write_failures > 0 {
            out.push_str(&format!("  Chunk write failures: {}\n", self.write_failures));
        }
        if self.cancelled {
            out.push_str("  Run was cancelled; summary is partial\n");
        }
        if !self.failures.is_empty() {
            out.push_str("\nFailures:\n");
            for failure in &self.failures {
                out.push_str(&format!("  {}: {}\n", failure.name, failure.error));
            }
        }
        out
    }
}

/// Accumulates task results into a [`RunSummary`]
pub struct Collector {
    summary: RunSummary,
    start: Instant,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        Self {
            summary: RunSummary::empty(),
            start: Instant::now(),
        }
    }

    /// Fold one result into the tally
    pub fn record(&mut self, result: &TaskResult) {
        let summary = &mut self.summary;
        summary.total += 1;
        summary.chunks_written += result.chunks_written;
        summary.write_failures += result.write_failures;

        match result.error {
            None => {
                summary.succeeded += 1;
                info!("done {} ({} chunks)", result.name, result.chunks_written);
            }
            Some(ref e) => {
                summary.failed += 1;
                warn!("error {}: {}", result.name, e);
                summary.failures.push(TaskFailure {
                    name: result.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    /// Drain `results` until every sender is gone, invoking `on_result` per result
    pub fn drain<F>(&mut self, results: &Receiver<TaskResult>, mut on_result: F)
    where
        F: FnMut(&TaskResult, &RunSummary),
    {
        for result in results.iter() {
            self.record(&result);
            on_result(&result, &self.summary);
        }
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn finish(mut self, cancelled: bool) -> RunSummary {
        self.summary.cancelled = cancelled;
        self.summary.duration_ms = self.start.elapsed().as_millis() as u64;
        self.summary.failures.sort_by(|a, b| a.name.cmp(&b.name));
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;

    fn ok(name: &str, chunks: usize) -> TaskResult {
        TaskResult {
            name: name.to_string(),
            chunks_written: chunks,
            write_failures: 0,
            error: None,
        }
    }

    fn failed(name: &str) -> TaskResult {
        TaskResult {
            name: name.to_string(),
            chunks_written: 0,
            write_failures: 0,
            error: Some(TaskError::UnsupportedType(".docx".to_string())),
        }
    }

    #[test]
    fn test_collector_tallies_results() {
        let mut collector = Collector::new();
        collector.record(&ok("a.pdf", 3));
        collector.record(&failed("z.docx"));
        collector.record(&ok("b.txt", 2));
        collector.record(&failed("c.docx"));

        let summary = collector.finish(false);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.chunks_written, 5);
        assert!(!summary.cancelled);
        assert!(!summary.is_clean());
        assert_eq!(
            summary.failures.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["c.docx", "z.docx"]
        );
        assert_eq!(summary.failures[0].error, "unsupported file type: .docx");
    }

    #[test]
    fn test_drain_until_senders_close() {
        let (tx, rx) = crossbeam_channel::unbounded();
        for i in 0..5 {
            tx.send(ok(&format!("doc_{}.txt", i), 1)).unwrap();
        }
        drop(tx);

        let mut seen = 0;
        let mut collector = Collector::new();
        collector.drain(&rx, |_, summary| {
            seen += 1;
            assert_eq!(summary.total, seen);
        });

        let summary = collector.finish(true);
        assert_eq!(seen, 5);
        assert_eq!(summary.succeeded, 5);
        assert!(summary.cancelled);
    }

    #[test]
    fn test_human_report() {
        let mut collector = Collector::new();
        collector.record(&failed("slides.docx"));
        let report = collector.finish(true).to_human_string();

        assert!(report.contains("Processed 1 files"));
        assert!(report.contains("Failed: 1"));
        assert!(report.contains("slides.docx: unsupported file type: .docx"));
        assert!(report.contains("cancelled"));
    }

    #[test]
    fn test_summary_serializes() {
        let mut collector = Collector::new();
        collector.record(&ok("a.pdf", 2));
        let json = serde_json::to_value(collector.finish(false)).unwrap();
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["chunks_written"], 2);
    }
}
