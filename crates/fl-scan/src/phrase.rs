//! Text between a start phrase and an end phrase.

use regex::{Match, Regex};

use crate::ScanResult;
use crate::buffer::{ChunkOutcome, ChunkSearch};
use crate::error::compile;

/// A pair of regex phrases bounding the region to extract.
///
/// With `include_pairs` the returned text runs from the start of the start
/// phrase to the end of the end phrase; otherwise it runs from just after the
/// start phrase to just before the end phrase.
#[derive(Debug, Clone)]
pub struct PhrasePair {
    start: Regex,
    end: Regex,
    include_pairs: bool,
}

impl PhrasePair {
    pub fn new(start: &str, end: &str, include_pairs: bool) -> ScanResult<Self> {
        Ok(Self {
            start: compile(start, "start phrase")?,
            end: compile(end, "end phrase")?,
            include_pairs,
        })
    }

    pub fn start_pattern(&self) -> &str {
        self.start.as_str()
    }

    pub fn end_pattern(&self) -> &str {
        self.end.as_str()
    }

    pub fn include_pairs(&self) -> bool {
        self.include_pairs
    }

    fn from_start(&self, m: Match<'_>) -> usize {
        if self.include_pairs { m.start() } else { m.end() }
    }

    fn to_end(&self, m: Match<'_>) -> usize {
        if self.include_pairs { m.end() } else { m.start() }
    }
}

impl ChunkSearch for PhrasePair {
    fn search(&self, chunk: &str, recording: bool) -> ChunkOutcome {
        // inside the span only the end phrase matters; a repeated start is
        // ordinary span text
        if recording {
            return match self.end.find(chunk) {
                Some(end) => ChunkOutcome::keep(&chunk[..self.to_end(end)], false),
                None => ChunkOutcome::keep(chunk, true),
            };
        }

        let Some(start) = self.start.find(chunk) else {
            return match self.end.find(chunk) {
                Some(end) => ChunkOutcome::keep(&chunk[..self.to_end(end)], false),
                None => ChunkOutcome::skip(false),
            };
        };

        match self.end.find_at(chunk, start.end()) {
            Some(end) => ChunkOutcome::keep(&chunk[self.from_start(start)..self.to_end(end)], false),
            None => ChunkOutcome::keep(&chunk[self.from_start(start)..], true),
        }
    }
}
