use fl_core::FlError;
use thiserror::Error;

pub type ScanResult<T> = Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Rows have inconsistent widths and no fill value is configured")]
    MissingFill,

    #[error("Invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Empty pattern for {what}")]
    EmptyPattern { what: &'static str },

    #[error(transparent)]
    Core(#[from] FlError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compile `pattern`, rejecting the empty pattern which would match everywhere.
pub(crate) fn compile(pattern: &str, what: &'static str) -> ScanResult<regex::Regex> {
    if pattern.is_empty() {
        return Err(ScanError::EmptyPattern { what });
    }
    regex::Regex::new(pattern).map_err(|e| ScanError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}
