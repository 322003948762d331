//! fl-results: multi-file aggregation, Workbench design points and the
//! parse cache.

pub mod aggregate;
pub mod design_point;
pub mod hash;
pub mod store;

pub use aggregate::{CaseFiles, LoadMode, ReportFilesOut, SolutionFiles};
pub use design_point::{DesignPoint, DesignPointFolder, FluentFolder, WorkbenchProject};
pub use hash::compute_entry_id;
pub use store::{CacheManifest, ParseCache};

use fl_core::FlError;
use fl_files::FilesError;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Files(#[from] FilesError),

    #[error(transparent)]
    Core(#[from] FlError),

    #[error("Variable {variable:?} not found in case {case}")]
    MissingVariable { variable: String, case: String },

    #[error("Case not found: {case}")]
    CaseNotFound { case: String },

    #[error("Cache entry not found: {id}")]
    EntryNotFound { id: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    #[error("Design point: {message}")]
    DesignPoint { message: String },
}
