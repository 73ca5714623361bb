//! Overlapping window chunker
//!
//! Text is accumulated page by page. While the buffer holds at least two
//! windows' worth of bytes, the first window is emitted and the buffer is
//! advanced by `chunk_size - chunk_overlap`. Once input ends the leftover
//! is drained with the same stride, so the last window may be short.
//!
//! Lengths are raw byte counts. A window boundary may fall inside a
//! multi-byte UTF-8 sequence; chunk payloads are written out unchanged.

use super::Chunk;
use crate::error::ConfigError;

/// Window geometry. Only constructible through [`WindowOptions::new`], so
/// `0 <= chunk_overlap < chunk_size` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOptions {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

impl WindowOptions {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ConfigError> {
        if chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if chunk_overlap >= chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Distance between the starts of consecutive windows
    pub fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

/// Per-task byte buffer plus chunk counter. Owned by exactly one worker.
#[derive(Debug)]
pub struct ChunkWindow {
    options: WindowOptions,
    buffer: Vec<u8>,
    next_index: usize,
}

impl ChunkWindow {
    pub fn new(options: WindowOptions) -> Self {
        Self {
            options,
            buffer: Vec::with_capacity(options.chunk_size * 2),
            next_index: 0,
        }
    }

    /// Append a segment of text, returning every window that became full
    pub fn push(&mut self, segment: impl AsRef<[u8]>) -> Vec<Chunk> {
        self.buffer.extend_from_slice(segment.as_ref());

        let size = self.options.chunk_size;
        let step = self.options.step();
        let mut ready = Vec::new();

        while self.buffer.len() >= size * 2 {
            let bytes = self.buffer[..size].to_vec();
            ready.push(self.make_chunk(bytes));
            self.buffer.drain(..step);
        }

        ready
    }

    /// Drain the leftover buffer with the regular stride
    pub fn finish(mut self) -> Vec<Chunk> {
        let size = self.options.chunk_size;
        let step = self.options.step();
        let len = self.buffer.len();
        let mut ready = Vec::new();

        let mut offset = 0;
        while offset < len {
            let end = (offset + size).min(len);
            let bytes = self.buffer[offset..end].to_vec();
            ready.push(self.make_chunk(bytes));
            offset += step;
        }

        ready
    }

    /// Number of chunks emitted so far
    pub fn emitted(&self) -> usize {
        self.next_index
    }

    /// Bytes currently held in the buffer
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn make_chunk(&mut self, bytes: Vec<u8>) -> Chunk {
        let chunk = Chunk {
            index: self.next_index,
            bytes,
        };
        self.next_index += 1;
        chunk
    }
}

/// Chunk a whole text in one go
pub fn chunk_text(text: impl AsRef<[u8]>, options: WindowOptions) -> Vec<Chunk> {
    let mut window = ChunkWindow::new(options);
    let mut chunks = window.push(text);
    chunks.extend(window.finish());
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths(chunks: &[Chunk]) -> Vec<usize> {
        chunks.iter().map(|c| c.bytes.len()).collect()
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert_eq!(WindowOptions::new(0, 0), Err(ConfigError::ZeroChunkSize));
        assert_eq!(
            WindowOptions::new(50, 50),
            Err(ConfigError::OverlapTooLarge {
                size: 50,
                overlap: 50
            })
        );
        assert_eq!(
            WindowOptions::new(4, 9),
            Err(ConfigError::OverlapTooLarge { size: 4, overlap: 9 })
        );
        assert!(WindowOptions::new(50, 49).is_ok());
        assert!(WindowOptions::new(1, 0).is_ok());
    }

    #[test]
    fn test_default_geometry() {
        let opts = WindowOptions::default();
        assert_eq!(opts.chunk_size(), 500);
        assert_eq!(opts.chunk_overlap(), 50);
        assert_eq!(opts.step(), 450);
    }

    #[test]
    fn test_1200_bytes_gives_500_500_300() {
        let text: String = (0..1200).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let chunks = chunk_text(&text, WindowOptions::default());

        assert_eq!(lengths(&chunks), vec![500, 500, 300]);
        assert_eq!(
            chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(chunks[0].bytes, text.as_bytes()[..500]);
        assert_eq!(chunks[1].bytes, text.as_bytes()[450..950]);
        assert_eq!(chunks[2].bytes, text.as_bytes()[900..]);
    }

    #[test]
    fn test_threshold_emission_while_streaming() {
        let mut window = ChunkWindow::new(WindowOptions::default());

        assert!(window.push("x".repeat(999)).is_empty());
        assert_eq!(window.buffered(), 999);

        let ready = window.push("y");
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].index, 0);
        assert_eq!(window.buffered(), 550);
        assert_eq!(window.emitted(), 1);

        let rest = window.finish();
        assert_eq!(lengths(&rest), vec![500, 100]);
        assert_eq!(rest[0].index, 1);
        assert_eq!(rest[1].index, 2);
    }

    #[test]
    fn test_empty_input_gives_no_chunks() {
        assert!(chunk_text("", WindowOptions::default()).is_empty());
    }

    #[test]
    fn test_short_input_gives_single_chunk() {
        let chunks = chunk_text("Hello, world!", WindowOptions::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].bytes, b"Hello, world!");
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn test_no_empty_trailing_chunk() {
        // leftover is an exact multiple of the step
        let opts = WindowOptions::new(10, 2).unwrap();
        let chunks = chunk_text("a".repeat(16), opts);
        assert_eq!(lengths(&chunks), vec![10, 8]);
        assert!(chunks.iter().all(|c| !c.bytes.is_empty()));
    }

    #[test]
    fn test_input_of_exactly_chunk_size() {
        let opts = WindowOptions::new(10, 2).unwrap();
        let chunks = chunk_text("0123456789", opts);
        assert_eq!(lengths(&chunks), vec![10, 2]);
        assert_eq!(chunks[1].bytes, b"89");
    }

    #[test]
    fn test_overlap_between_neighbours() {
        let opts = WindowOptions::new(8, 3).unwrap();
        let chunks = chunk_text("abcdefghijklmnopqrstuvwxyz", opts);

        for pair in chunks.windows(2) {
            let (prev, next) = (&pair[0].bytes, &pair[1].bytes);
            if prev.len() == 8 && next.len() >= 3 {
                assert_eq!(prev[5..], next[..3]);
            }
        }
    }

    #[test]
    fn test_multibyte_text_counts_bytes() {
        // 300 two-byte chars = 600 bytes
        let chunks = chunk_text("é".repeat(300), WindowOptions::default());
        assert_eq!(lengths(&chunks), vec![500, 150]);

        let joined: Vec<u8> = chunks[0].bytes[..450]
            .iter()
            .chain(chunks[1].bytes.iter())
            .copied()
            .collect();
        assert_eq!(joined, "é".repeat(300).into_bytes());
    }

    #[test]
    fn test_window_may_split_utf8_sequence() {
        let opts = WindowOptions::new(3, 1).unwrap();
        let chunks = chunk_text("aé€", opts);
        // bytes: 61 c3 a9 e2 82 ac
        assert_eq!(chunks[0].bytes, vec![0x61, 0xc3, 0xa9]);
        assert_eq!(chunks[1].bytes, vec![0xa9, 0xe2, 0x82]);
        assert_eq!(chunks[2].bytes, vec![0x82, 0xac]);
        assert_eq!(chunks.len(), 3);
    }
}
