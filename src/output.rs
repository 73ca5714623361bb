//! Terminal output - progress bar, status icons and summaries
//!
//! Logging goes through `tracing`; this module is only for what the user
//! is meant to read on stdout.

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::clean::CleanReport;
use crate::core::{RunSummary, TaskResult};
use crate::numbering::NumberingReport;

/// Status indicators
pub struct StatusIcons;

impl StatusIcons {
    pub const SUCCESS: &'static str = "✓";
    pub const ERROR: &'static str = "✗";
    pub const WARNING: &'static str = "⚠";
    pub const INFO: &'static str = "ℹ";
}

/// Live progress for a chunking run.
///
/// The number of sources is unknown until the scanner finishes, so this is
/// a counting spinner rather than a bounded bar.
pub struct RunProgress {
    bar: ProgressBar,
}

impl RunProgress {
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Hidden progress, for JSON output
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Print one line per finished task above the spinner
    pub fn on_result(&self, result: &TaskResult, summary: &RunSummary) {
        let line = match result.error {
            None => format!(
                "{} {} ({} chunks)",
                StatusIcons::SUCCESS.green(),
                result.name,
                result.chunks_written
            ),
            Some(ref e) => format!(
                "{} {}: {}",
                StatusIcons::ERROR.red(),
                result.name,
                e.to_string().red()
            ),
        };
        self.bar.println(line);
        self.bar.set_message(format!(
            "{} done, {} failed, {} chunks",
            summary.succeeded, summary.failed, summary.chunks_written
        ));
        self.bar.tick();
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Print a styled header
pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bright_white().bold());
    println!("{}", "─".repeat(title.chars().count().max(40)).bright_black());
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.bright_black(), value.white());
}

pub fn print_success(msg: &str) {
    println!("{} {}", StatusIcons::SUCCESS.green(), msg.green());
}

pub fn print_warning(msg: &str) {
    println!("{} {}", StatusIcons::WARNING.yellow(), msg.yellow());
}

pub fn print_info(msg: &str) {
    println!("{} {}", StatusIcons::INFO.cyan(), msg.cyan());
}

/// Final chunking report
pub fn print_run_summary(summary: &RunSummary) {
    print_header("Chunking summary");
    print!("{}", summary.to_human_string());
    println!();
    if summary.cancelled {
        print_warning("Cancelled before all files were processed");
    } else if summary.is_clean() {
        print_success("All files chunked");
    } else {
        print_warning(&format!(
            "{} file(s) failed, {} chunk write(s) failed",
            summary.failed, summary.write_failures
        ));
    }
}

pub fn print_clean_report(report: &CleanReport, dry_run: bool) {
    print_header(if dry_run {
        "Clean (dry run)"
    } else {
        "Clean"
    });
    print_kv("Files scanned", &report.files_scanned.to_string());
    print_kv("Files changed", &report.files_changed.to_string());
    print_kv("Characters removed", &report.characters_removed.to_string());
    for err in &report.errors {
        println!("  {} {}", StatusIcons::ERROR.red(), err);
    }
}

pub fn print_numbering_report(report: &NumberingReport, dry_run: bool) {
    for rename in &report.renamed {
        let verb = if dry_run { "would rename" } else { "renamed" };
        println!(
            "  {} {} -> {}",
            verb.bright_black(),
            rename.from.display(),
            rename.to.display()
        );
    }
    for err in &report.errors {
        println!("  {} {}", StatusIcons::ERROR.red(), err);
    }
    if report.renamed.is_empty() && report.errors.is_empty() {
        print_info("No PDFs found");
    }
}
