//! Settings resolution and conversion into parser options.

use std::path::Path;

use fl_config::{ScanModeDef, Settings};
use fl_files::{ReportOptions, SolutionOptions};
use fl_scan::ScanMode;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Environment variable naming a settings file.
pub const SETTINGS_ENV: &str = "FLUENTIO_SETTINGS";

/// Settings from `explicit`, else from `$FLUENTIO_SETTINGS`, else defaults.
pub fn resolve_settings(explicit: Option<&Path>) -> AppResult<Settings> {
    if let Some(path) = explicit {
        return load_from(path);
    }
    match std::env::var_os(SETTINGS_ENV) {
        Some(path) if !path.is_empty() => load_from(Path::new(&path)),
        _ => {
            debug!("no settings file; using defaults");
            Ok(Settings::default())
        }
    }
}

fn load_from(path: &Path) -> AppResult<Settings> {
    if !path.exists() {
        return Err(AppError::SettingsFile {
            path: path.to_path_buf(),
            message: "file does not exist".to_string(),
        });
    }
    debug!(path = %path.display(), "loading settings");
    Ok(fl_config::load(path)?)
}

pub fn scan_mode(mode: ScanModeDef) -> ScanMode {
    match mode {
        ScanModeDef::Buffered => ScanMode::Buffered,
        ScanModeDef::WholeFile => ScanMode::WholeFile,
    }
}

pub fn solution_options(settings: &Settings) -> SolutionOptions {
    let solution = &settings.solution;
    SolutionOptions {
        start_phrase: solution.start_phrase.clone(),
        end_phrase: solution.end_phrase.clone(),
        iterate_phrases: solution.iterate_phrases.clone(),
        strict: solution.strict,
        stop_at_prompt: solution.stop_at_prompt,
        chunk_size: settings.scan.chunk_size,
        scan_mode: scan_mode(settings.scan.mode),
    }
}

pub fn report_options(settings: &Settings) -> ReportOptions {
    ReportOptions {
        header_line: settings.report.header_line,
        data_start: settings.report.data_start,
        ..ReportOptions::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_parser_defaults() {
        let settings = Settings::default();
        assert_eq!(solution_options(&settings), SolutionOptions::default());
        assert_eq!(report_options(&settings), ReportOptions::default());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = resolve_settings(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(err, AppError::SettingsFile { .. }));
    }

    #[test]
    fn whole_file_mode_is_carried_over() {
        let mut settings = Settings::default();
        settings.scan.mode = ScanModeDef::WholeFile;
        settings.solution.strict = true;
        let options = solution_options(&settings);
        assert_eq!(options.scan_mode, ScanMode::WholeFile);
        assert!(options.strict);
    }
}
