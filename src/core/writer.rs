//! Chunk Writer - one short-lived writer thread per task
//!
//! The worker producing a task's chunks is the only sender, so chunks
//! arrive (and are written) in index order. Each write is independent: a
//! failure is logged and counted, and the next chunk is still attempted.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Sender};

use super::Chunk;
use crate::error::WriteError;

/// Capacity of the worker -> writer queue
const CHUNK_QUEUE_SIZE: usize = 4;

/// Counts reported by a writer once its queue is drained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub written: usize,
    pub failed: usize,
}

/// File name for a chunk index; widens naturally past 999
pub fn chunk_file_name(index: usize) -> String {
    format!("chunk_{:03}.txt", index)
}

/// Write a single chunk into `dir`
pub fn write_chunk(dir: &Path, chunk: &Chunk) -> Result<PathBuf, WriteError> {
    let path = dir.join(chunk_file_name(chunk.index));
    fs::write(&path, &chunk.bytes).map_err(|source| WriteError {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Handle to a running writer thread
pub struct ChunkWriter {
    tx: Option<Sender<Chunk>>,
    handle: Option<JoinHandle<WriterStats>>,
    /// Chunks that never reached the writer thread
    dropped: usize,
}

impl ChunkWriter {
    /// Start a writer persisting chunks into `dir` (which must already exist)
    pub fn spawn(dir: PathBuf) -> std::io::Result<Self> {
        let (tx, rx) = bounded::<Chunk>(CHUNK_QUEUE_SIZE);

        let handle = thread::Builder::new()
            .name("chunk-writer".to_string())
            .spawn(move || {
                let mut stats = WriterStats::default();
                for chunk in rx {
                    match write_chunk(&dir, &chunk) {
                        Ok(_) => stats.written += 1,
                        Err(e) => {
                            stats.failed += 1;
                            tracing::warn!("{}", e);
                        }
                    }
                }
                stats
            })?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            dropped: 0,
        })
    }

    /// Queue a chunk, blocking while the queue is full.
    /// Returns `false` if the writer thread is gone; the chunk then counts
    /// as a failed write.
    pub fn send(&mut self, chunk: Chunk) -> bool {
        let index = chunk.index;
        let sent = match self.tx {
            Some(ref tx) => tx.send(chunk).is_ok(),
            None => false,
        };
        if !sent {
            self.dropped += 1;
            tracing::warn!("Chunk writer gone, dropped chunk {}", index);
        }
        sent
    }

    /// Signal that no more chunks will arrive and wait for the queue to drain
    pub fn finish(mut self) -> WriterStats {
        self.close()
    }

    fn close(&mut self) -> WriterStats {
        drop(self.tx.take());
        let mut stats = match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                tracing::error!("Chunk writer thread panicked");
                WriterStats::default()
            }),
            None => WriterStats::default(),
        };
        stats.failed += std::mem::take(&mut self.dropped);
        stats
    }
}

impl Drop for ChunkWriter {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn chunk(index: usize, text: &str) -> Chunk {
        Chunk {
            index,
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_chunk_file_name() {
        assert_eq!(chunk_file_name(0), "chunk_000.txt");
        assert_eq!(chunk_file_name(42), "chunk_042.txt");
        assert_eq!(chunk_file_name(999), "chunk_999.txt");
        assert_eq!(chunk_file_name(1000), "chunk_1000.txt");
    }

    #[test]
    fn test_writer_persists_every_chunk() {
        let dir = tempdir().unwrap();
        let mut writer = ChunkWriter::spawn(dir.path().to_path_buf()).unwrap();

        for i in 0..10 {
            assert!(writer.send(chunk(i, &format!("chunk {}", i))));
        }
        let stats = writer.finish();

        assert_eq!(stats, WriterStats { written: 10, failed: 0 });
        for i in 0..10 {
            let content = std::fs::read_to_string(dir.path().join(chunk_file_name(i))).unwrap();
            assert_eq!(content, format!("chunk {}", i));
        }
    }

    #[test]
    fn test_write_failures_do_not_stop_siblings() {
        let dir = tempdir().unwrap();
        // a directory squatting on chunk_001.txt makes that single write fail
        std::fs::create_dir(dir.path().join(chunk_file_name(1))).unwrap();

        let mut writer = ChunkWriter::spawn(dir.path().to_path_buf()).unwrap();
        for i in 0..3 {
            writer.send(chunk(i, "text"));
        }
        let stats = writer.finish();

        assert_eq!(stats, WriterStats { written: 2, failed: 1 });
        assert!(dir.path().join(chunk_file_name(0)).is_file());
        assert!(dir.path().join(chunk_file_name(2)).is_file());
    }

    #[test]
    fn test_dropped_writer_still_drains() {
        let dir = tempdir().unwrap();
        {
            let mut writer = ChunkWriter::spawn(dir.path().to_path_buf()).unwrap();
            writer.send(chunk(0, "early exit"));
        }
        assert_eq!(
            std::fs::read_to_string(dir.path().join("chunk_000.txt")).unwrap(),
            "early exit"
        );
    }

    #[test]
    fn test_send_to_gone_writer_counts_as_failure() {
        let (tx, rx) = bounded::<Chunk>(CHUNK_QUEUE_SIZE);
        drop(rx);
        let mut writer = ChunkWriter {
            tx: Some(tx),
            handle: None,
            dropped: 0,
        };

        assert!(!writer.send(chunk(0, "lost")));
        assert!(!writer.send(chunk(1, "lost")));
        assert_eq!(writer.finish(), WriterStats { written: 0, failed: 2 });
    }

    #[test]
    fn test_write_raw_bytes() {
        let dir = tempdir().unwrap();
        // second half of a UTF-8 sequence, as left by a window boundary
        let chunk = Chunk {
            index: 7,
            bytes: vec![0xa9, b'x', 0xe2],
        };
        let path = write_chunk(dir.path(), &chunk).unwrap();
        assert_eq!(path, dir.path().join("chunk_007.txt"));
        assert_eq!(std::fs::read(path).unwrap(), vec![0xa9, b'x', 0xe2]);
    }
}
