//! Chunked scan loop.
//!
//! Fluent transcripts can be very large, so the scanner reads a bounded chunk
//! at a time and hands each chunk to a [`ChunkSearch`] strategy. The strategy
//! decides what part of the chunk to keep and whether to keep reading. The
//! only state carried between chunks is the `record` flag held by
//! [`ScanBuffer`].
//!
//! A phrase that straddles two chunks is not seen by either search. Use
//! [`ScanMode::WholeFile`] when that matters more than memory.

use fl_core::{FlError, TextSource};
use tracing::debug;

use crate::ScanResult;

/// Default read size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// How the scanner pulls text from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Bounded reads of `chunk_size` bytes.
    #[default]
    Buffered,
    /// One read of the whole source, searched as a single chunk.
    WholeFile,
}

/// Result of searching one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutcome {
    /// Text to append while recording.
    pub emit: Option<String>,
    /// Whether to read another chunk.
    pub continue_scan: bool,
    /// Whether the scan is inside the requested region.
    pub record: bool,
}

impl ChunkOutcome {
    pub fn skip(record: bool) -> Self {
        Self {
            emit: None,
            continue_scan: true,
            record,
        }
    }

    pub fn keep(text: &str, continue_scan: bool) -> Self {
        Self {
            emit: Some(text.to_string()),
            continue_scan,
            record: true,
        }
    }
}

/// Per-chunk search strategy.
pub trait ChunkSearch {
    /// Search one chunk. `recording` is true when an earlier chunk already
    /// entered the requested region.
    fn search(&self, chunk: &str, recording: bool) -> ChunkOutcome;
}

/// Accumulated state of one scan.
#[derive(Debug, Clone)]
pub struct ScanBuffer {
    text: String,
    continue_scan: bool,
    record: bool,
    chunks: usize,
}

impl Default for ScanBuffer {
    fn default() -> Self {
        Self {
            text: String::new(),
            continue_scan: true,
            record: false,
            chunks: 0,
        }
    }
}

impl ScanBuffer {
    pub fn is_recording(&self) -> bool {
        self.record
    }

    pub fn wants_more(&self) -> bool {
        self.continue_scan
    }

    pub fn chunks_seen(&self) -> usize {
        self.chunks
    }

    /// Fold one chunk outcome into the buffer.
    pub fn absorb(&mut self, outcome: ChunkOutcome) {
        self.chunks += 1;
        self.continue_scan = outcome.continue_scan;
        self.record = outcome.record;
        if self.record {
            if let Some(text) = outcome.emit {
                self.text.push_str(&text);
            }
        }
    }

    /// Accumulated text with surrounding whitespace removed.
    pub fn finish(self) -> String {
        self.text.trim().to_string()
    }
}

/// Drives a [`ChunkSearch`] over a [`TextSource`].
#[derive(Debug, Clone, Copy)]
pub struct BufferedScanner {
    chunk_size: usize,
    mode: ScanMode,
}

impl Default for BufferedScanner {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            mode: ScanMode::Buffered,
        }
    }
}

impl BufferedScanner {
    pub fn new(chunk_size: usize, mode: ScanMode) -> ScanResult<Self> {
        if chunk_size == 0 {
            return Err(FlError::InvalidArg {
                what: "chunk_size must be positive",
            }
            .into());
        }
        Ok(Self { chunk_size, mode })
    }

    pub fn whole_file() -> Self {
        Self {
            mode: ScanMode::WholeFile,
            ..Self::default()
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Run `search` over `source` from its current position.
    pub fn scan<S, C>(&self, source: &mut S, search: &C) -> ScanResult<String>
    where
        S: TextSource + ?Sized,
        C: ChunkSearch + ?Sized,
    {
        let mut buffer = ScanBuffer::default();
        while buffer.wants_more() {
            let chunk = match self.mode {
                ScanMode::Buffered => source.read_chunk(self.chunk_size)?,
                ScanMode::WholeFile => source.read_remaining()?,
            };
            if chunk.is_empty() {
                break;
            }
            buffer.absorb(search.search(&chunk, buffer.is_recording()));
        }
        debug!(
            chunks = buffer.chunks_seen(),
            complete = !buffer.wants_more(),
            "scan finished"
        );
        Ok(buffer.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_core::StringSource;

    /// Records every chunk that contains a digit, stops at `#`.
    struct Digits;

    impl ChunkSearch for Digits {
        fn search(&self, chunk: &str, recording: bool) -> ChunkOutcome {
            if let Some(i) = chunk.find('#') {
                return ChunkOutcome::keep(&chunk[..i], false);
            }
            if recording || chunk.chars().any(|c| c.is_ascii_digit()) {
                ChunkOutcome::keep(chunk, true)
            } else {
                ChunkOutcome::skip(false)
            }
        }
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(BufferedScanner::new(0, ScanMode::Buffered).is_err());
    }

    #[test]
    fn scan_stops_when_search_says_so() {
        let scanner = BufferedScanner::new(4, ScanMode::Buffered).unwrap();
        let mut src = StringSource::from_text("abcd ef1 ghij k#lm 9999");
        assert_eq!(scanner.scan(&mut src, &Digits).unwrap(), "ef1 ghij k");
    }

    #[test]
    fn whole_file_mode_searches_once() {
        let mut src = StringSource::from_text("abcd ef1 ghij k#lm");
        let out = BufferedScanner::whole_file().scan(&mut src, &Digits).unwrap();
        assert_eq!(out, "abcd ef1 ghij k");
    }

    #[test]
    fn buffer_ignores_emits_when_not_recording() {
        let mut buffer = ScanBuffer::default();
        buffer.absorb(ChunkOutcome {
            emit: Some("dropped".into()),
            continue_scan: true,
            record: false,
        });
        buffer.absorb(ChunkOutcome::keep("  kept  ", false));
        assert!(!buffer.wants_more());
        assert_eq!(buffer.finish(), "kept");
    }
}
