//! fl-scan: streaming text extraction for Fluent output files.
//!
//! Contains:
//! - buffer (chunked scan loop and the per-chunk search strategy)
//! - phrase (span between a start and an end phrase)
//! - repeated (run of consecutive lines sharing a phrase)
//! - delimited (delimited text to rows of nullable floats)

pub mod buffer;
pub mod delimited;
pub mod error;
pub mod phrase;
pub mod repeated;

pub use buffer::{BufferedScanner, ChunkOutcome, ChunkSearch, DEFAULT_CHUNK_SIZE, ScanBuffer, ScanMode};
pub use delimited::{CoercedRows, Delimiter, DelimitedOptions, EmptyColumns, coerce_delimited};
pub use error::{ScanError, ScanResult};
pub use phrase::PhrasePair;
pub use repeated::RepeatedPhrase;
