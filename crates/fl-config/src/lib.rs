//! fl-config: settings file format and validation.

pub mod migrate;
pub mod schema;
pub mod validate;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_settings};

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &std::path::Path) -> SettingsResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

/// Parse, migrate and validate settings from YAML text.
pub fn from_yaml_str(content: &str) -> SettingsResult<Settings> {
    let mut settings: Settings = serde_yaml::from_str(content)?;
    settings = migrate_to_latest(settings)?;
    validate_settings(&settings)?;
    Ok(settings)
}

pub fn save_yaml(path: &std::path::Path, settings: &Settings) -> SettingsResult<()> {
    validate_settings(settings)?;
    let content = serde_yaml::to_string(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> SettingsResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    let mut settings: Settings = serde_json::from_str(&content)?;
    settings = migrate_to_latest(settings)?;
    validate_settings(&settings)?;
    Ok(settings)
}

pub fn save_json(path: &std::path::Path, settings: &Settings) -> SettingsResult<()> {
    validate_settings(settings)?;
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load from `.json` when the extension says so, YAML otherwise.
pub fn load(path: &std::path::Path) -> SettingsResult<Settings> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}
