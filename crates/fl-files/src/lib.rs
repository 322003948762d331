//! fl-files: parsers for single Fluent output files.
//!
//! Contains:
//! - solution (transcripts: residual history, run status, Workbench parameters)
//! - report (report definition `.out` files)
//! - xy (XY-plot exports)
//! - post (CFD-Post exports)
//! - surface (surface ASCII exports)
//! - integral (surface integral reports)
//!
//! Every parser owns a [`FileHandle`](fl_core::FileHandle), so the file is
//! open exactly as long as the parser lives.

pub mod error;
pub mod integral;
pub mod post;
pub mod report;
pub mod solution;
pub mod surface;
pub mod xy;

mod blocks;

use std::path::Path;

pub use blocks::NamedBlocks;
pub use error::{FilesError, FilesResult, FormatError};
pub use integral::{IntegralEntry, SurfaceIntegral, SurfaceIntegralFile};
pub use post::PostDataFile;
pub use report::{ReportFileOut, ReportOptions, Skip};
pub use solution::{AdvisoryStatus, SolutionFile, SolutionOptions, WorkbenchParam};
pub use surface::{Statistic, SurfaceFile};
pub use xy::XyDataFile;

/// A Fluent output file that can be opened from disk and read into a table.
pub trait FluentFile: Sized {
    type Options: Clone + Default + Send + Sync;
    type Output;

    /// Open `path`. The file stays open until the parser is dropped.
    fn open_with(path: &Path, options: Self::Options) -> FilesResult<Self>;

    /// Parse the file from the beginning.
    fn read(&mut self) -> FilesResult<Self::Output>;

    fn open(path: &Path) -> FilesResult<Self> {
        Self::open_with(path, Self::Options::default())
    }
}
