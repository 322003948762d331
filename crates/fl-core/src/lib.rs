//! fl-core: stable foundation for fluentio.
//!
//! Contains:
//! - error (shared error types)
//! - numeric (Real + lenient float parsing)
//! - table (index-keyed tables of nullable floats)
//! - source (text sources and the scoped file handle)
//! - timing (opt-in phase timers)

pub mod error;
pub mod numeric;
pub mod source;
pub mod table;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FlError, FlResult};
pub use numeric::*;
pub use source::{FileHandle, FileSource, ReaderSource, StringSource, TextSource};
pub use table::{CaseTable, Cell, IterationTable, RowTable, SeriesTable, Table};
