use fl_core::FlError;
use fl_scan::ScanError;
use thiserror::Error;

pub type FilesResult<T> = Result<T, FilesError>;

/// The file does not have the layout its parser expects.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("{file}: no solution header found; is this a solution transcript?")]
    NotSolutionFile { file: String },

    #[error("{file}: no report header at line {line}")]
    NotReportFile { file: String, line: usize },

    #[error("{file}: malformed line {line_no}: {line:?}")]
    MalformedLine {
        file: String,
        line_no: usize,
        line: String,
    },

    #[error("{file}: row {row} has {found} values but the header names {expected}")]
    ColumnMismatch {
        file: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{file}: {what}")]
    Layout { file: String, what: String },
}

#[derive(Error, Debug)]
pub enum FilesError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Core(#[from] FlError),
}

impl FormatError {
    pub(crate) fn layout(file: impl Into<String>, what: impl Into<String>) -> Self {
        Self::Layout {
            file: file.into(),
            what: what.into(),
        }
    }
}
