//! Run of consecutive lines that all contain the same phrase.
//!
//! Workbench writes its input parameters into the transcript as a block of
//! `WB->Fluent:Parameter ...` lines; this search returns that block.

use crate::ScanResult;
use crate::buffer::{ChunkOutcome, ChunkSearch};
use crate::error::ScanError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatedPhrase {
    phrase: String,
}

impl RepeatedPhrase {
    pub fn new(phrase: impl Into<String>) -> ScanResult<Self> {
        let phrase = phrase.into();
        if phrase.is_empty() {
            return Err(ScanError::EmptyPattern {
                what: "repeated phrase",
            });
        }
        Ok(Self { phrase })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }
}

impl ChunkSearch for RepeatedPhrase {
    fn search(&self, chunk: &str, recording: bool) -> ChunkOutcome {
        let mut started = recording;
        let mut kept = String::new();

        // pieces keep their terminators so a line cut by the chunk boundary
        // is rejoined when the next chunk is appended
        for piece in chunk.split_inclusive('\n') {
            if piece.contains(self.phrase.as_str()) {
                started = true;
                kept.push_str(piece);
            } else if started {
                return ChunkOutcome::keep(&kept, false);
            }
        }

        if started {
            ChunkOutcome::keep(&kept, true)
        } else {
            ChunkOutcome::skip(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferedScanner;
    use crate::buffer::ScanMode;
    use fl_core::StringSource;

    const TRANSCRIPT: &str = "\
Welcome to Fluent
WB->Fluent:Parameter name:inlet_v, value:1.5
WB->Fluent:Parameter name:outlet_p, value:101325
WB->Fluent:Parameter name:wall_t, value:300
  iter  continuity
WB->Fluent:Parameter name:late, value:9
";

    fn scan(chunk: usize) -> String {
        let search = RepeatedPhrase::new("WB->Fluent:Parameter").unwrap();
        BufferedScanner::new(chunk, ScanMode::Buffered)
            .unwrap()
            .scan(&mut StringSource::from_text(TRANSCRIPT), &search)
            .unwrap()
    }

    #[test]
    fn returns_first_contiguous_run() {
        let out = scan(4096);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("inlet_v, value:1.5"));
        assert!(lines[2].ends_with("wall_t, value:300"));
    }

    #[test]
    fn run_continues_across_chunks() {
        let search = RepeatedPhrase::new("P:").unwrap();
        assert_eq!(
            search.search("head\nP:1\n", false),
            ChunkOutcome::keep("P:1\n", true)
        );
        assert_eq!(
            search.search("P:2\nP:3\ntail\nP:4\n", true),
            ChunkOutcome::keep("P:2\nP:3\n", false)
        );
        assert_eq!(search.search("head\n", false), ChunkOutcome::skip(false));
    }

    #[test]
    fn no_match_is_empty() {
        let search = RepeatedPhrase::new("absent").unwrap();
        let out = BufferedScanner::default()
            .scan(&mut StringSource::from_text(TRANSCRIPT), &search)
            .unwrap();
        assert!(out.is_empty());
    }
}
