//! Benchmarks for docchunk
//!
//! Run: cargo bench
//! Run specific: cargo bench -- chunk_text
//! Compare: cargo bench -- --save-baseline v1 && cargo bench -- --baseline v1

use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use docchunk::core::{
    chunk_text, ChunkPipeline, ChunkWindow, PipelineOptions, ScanOptions, Scanner, WindowOptions,
};
use tempfile::tempdir;

fn sample_text(chars: usize) -> String {
    let base = "Perovskite solar cells reach 25% efficiency but degrade under humidity. ";
    base.chars().cycle().take(chars).collect()
}

// ============================================================================
// Sliding Window (throughput-oriented)
// ============================================================================

fn benchmark_chunk_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_text");
    let opts = WindowOptions::default();

    for size in [1_000, 10_000, 100_000, 1_000_000].iter() {
        let text = sample_text(*size);

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(chunk_text(black_box(&text), opts)))
        });
    }

    group.finish();
}

fn benchmark_streamed_pages(c: &mut Criterion) {
    // ~3k chars per page, like a dense two-column paper
    let pages: Vec<String> = (0..40).map(|_| sample_text(3_000)).collect();
    let total: usize = pages.iter().map(|p| p.len()).sum();

    let mut group = c.benchmark_group("chunk_window_pages");
    group.throughput(Throughput::Bytes(total as u64));
    group.bench_function("40_pages", |b| {
        b.iter(|| {
            let mut window = ChunkWindow::new(WindowOptions::default());
            let mut count = 0usize;
            for page in &pages {
                count += window.push(page).len();
            }
            count += window.finish().len();
            black_box(count)
        })
    });
    group.finish();
}

// ============================================================================
// Scan + Pipeline (I/O-bound)
// ============================================================================

fn create_bench_tree(dir: &Path, count: usize) {
    for i in 0..count {
        let subdir = dir.join(format!("topic_{}", i % 10));
        std::fs::create_dir_all(&subdir).unwrap();

        let ext = if i % 4 == 0 { "md" } else { "txt" };
        let path = subdir.join(format!("paper_{}.{}", i, ext));
        std::fs::write(&path, sample_text(2_000 + (i % 7) * 500)).unwrap();
    }
}

fn benchmark_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    group.sample_size(10); // Fewer samples for I/O-bound benchmarks

    for &file_count in &[100, 1000] {
        let dir = tempdir().unwrap();
        create_bench_tree(dir.path(), file_count);
        let scanner = Scanner::new(ScanOptions {
            source: dir.path().to_path_buf(),
            ..Default::default()
        });

        group.throughput(Throughput::Elements(file_count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(file_count), &file_count, |b, _| {
            b.iter(|| black_box(scanner.scan().unwrap().len()))
        });
    }

    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    create_bench_tree(input.path(), 200);

    for &workers in &[1, 4] {
        let pipeline = ChunkPipeline::new(PipelineOptions {
            input: input.path().to_path_buf(),
            output: output.path().to_path_buf(),
            workers,
            ..Default::default()
        })
        .unwrap();

        group.throughput(Throughput::Elements(200));
        group.bench_with_input(BenchmarkId::new("workers", workers), &workers, |b, _| {
            b.iter(|| black_box(pipeline.run().unwrap().chunks_written))
        });
    }

    group.finish();
}

// ============================================================================
// Groups
// ============================================================================

criterion_group!(
    benches,
    benchmark_chunk_text,
    benchmark_streamed_pages,
    benchmark_scan,
    benchmark_pipeline,
);

criterion_main!(benches);
