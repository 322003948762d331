//! Settings validation logic.

use regex::Regex;

use crate::schema::Settings;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid pattern for {field}: {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_settings(settings: &Settings) -> Result<(), ValidationError> {
    if settings.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: settings.version,
        });
    }

    if settings.scan.chunk_size == 0 {
        return Err(ValidationError::InvalidValue {
            field: "scan.chunk_size".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    validate_pattern("solution.start_phrase", &settings.solution.start_phrase)?;
    validate_pattern("solution.end_phrase", &settings.solution.end_phrase)?;

    if settings.solution.iterate_phrases.iter().any(String::is_empty) {
        return Err(ValidationError::InvalidValue {
            field: "solution.iterate_phrases".to_string(),
            value: "\"\"".to_string(),
            reason: "phrases must be non-empty".to_string(),
        });
    }

    let report = &settings.report;
    if report.header_line >= report.data_start {
        return Err(ValidationError::InvalidValue {
            field: "report.header_line".to_string(),
            value: report.header_line.to_string(),
            reason: format!("must be less than report.data_start ({})", report.data_start),
        });
    }

    Ok(())
}

fn validate_pattern(field: &str, pattern: &str) -> Result<(), ValidationError> {
    if pattern.is_empty() {
        return Err(ValidationError::InvalidPattern {
            field: field.to_string(),
            reason: "pattern is empty".to_string(),
        });
    }
    Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
        field: field.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        validate_settings(&Settings::default()).unwrap();
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let mut s = Settings::default();
        s.scan.chunk_size = 0;
        assert!(matches!(
            validate_settings(&s),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn bad_phrase_rejected() {
        let mut s = Settings::default();
        s.solution.end_phrase = "Writing (".to_string();
        let err = validate_settings(&s).unwrap_err();
        assert!(err.to_string().contains("solution.end_phrase"));

        s.solution.end_phrase = String::new();
        assert!(validate_settings(&s).is_err());
    }

    #[test]
    fn header_must_precede_data() {
        let mut s = Settings::default();
        s.report.header_line = 3;
        assert!(validate_settings(&s).is_err());
    }

    #[test]
    fn future_version_rejected() {
        let s = Settings {
            version: 99,
            ..Settings::default()
        };
        assert!(matches!(
            validate_settings(&s),
            Err(ValidationError::UnsupportedVersion { version: 99 })
        ));
    }
}
