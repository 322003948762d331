//! Error types for the fl-app service layer.

use std::path::PathBuf;

/// Application error type that flattens errors from the backend crates into
/// one interface for the frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Failed to read settings file: {path}: {message}")]
    SettingsFile { path: PathBuf, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fl-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<fl_config::SettingsError> for AppError {
    fn from(err: fl_config::SettingsError) -> Self {
        AppError::Settings(err.to_string())
    }
}

impl From<fl_files::FilesError> for AppError {
    fn from(err: fl_files::FilesError) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<fl_core::FlError> for AppError {
    fn from(err: fl_core::FlError) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<fl_results::ResultsError> for AppError {
    fn from(err: fl_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}
