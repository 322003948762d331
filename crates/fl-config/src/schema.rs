//! Settings schema definitions.
//!
//! Every section has defaults, so an empty file (or no file at all) is a
//! valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;
pub const DEFAULT_START_PHRASE: &str = "  iter  ";
/// Escaped pipe: only the final `| gzip` data write ends the history, not
/// every `Writing "` line.
pub const DEFAULT_END_PHRASE: &str = r#"Writing "\| gzip -2cf >"#;
pub const DEFAULT_ITERATE_PHRASES: [&str; 4] =
    ["> solve/iterate", "solve/iterate", "> iterate", "iterate"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub scan: ScanDef,
    #[serde(default)]
    pub solution: SolutionDef,
    #[serde(default)]
    pub report: ReportDef,
    #[serde(default)]
    pub aggregate: AggregateDef,
    #[serde(default)]
    pub cache: CacheDef,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: crate::LATEST_VERSION,
            scan: ScanDef::default(),
            solution: SolutionDef::default(),
            report: ReportDef::default(),
            aggregate: AggregateDef::default(),
            cache: CacheDef::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScanModeDef {
    #[default]
    Buffered,
    WholeFile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanDef {
    /// Bytes per read in buffered mode.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub mode: ScanModeDef,
}

impl Default for ScanDef {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            mode: ScanModeDef::Buffered,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolutionDef {
    #[serde(default = "default_start_phrase")]
    pub start_phrase: String,
    #[serde(default = "default_end_phrase")]
    pub end_phrase: String,
    #[serde(default = "default_iterate_phrases")]
    pub iterate_phrases: Vec<String>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default = "default_true")]
    pub stop_at_prompt: bool,
}

impl Default for SolutionDef {
    fn default() -> Self {
        Self {
            start_phrase: default_start_phrase(),
            end_phrase: default_end_phrase(),
            iterate_phrases: default_iterate_phrases(),
            strict: false,
            stop_at_prompt: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDef {
    #[serde(default = "default_header_line")]
    pub header_line: usize,
    #[serde(default = "default_data_start")]
    pub data_start: usize,
}

impl Default for ReportDef {
    fn default() -> Self {
        Self {
            header_line: default_header_line(),
            data_start: default_data_start(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AggregateDef {
    /// Omit cases that lack a requested variable instead of failing.
    #[serde(default)]
    pub ignore_missing: bool,
    /// Parse case files on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CacheDef {
    #[serde(default)]
    pub enabled: bool,
    /// Cache root; defaults to `.fluentio/cache` next to the parsed file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_start_phrase() -> String {
    DEFAULT_START_PHRASE.to_string()
}

fn default_end_phrase() -> String {
    DEFAULT_END_PHRASE.to_string()
}

fn default_iterate_phrases() -> Vec<String> {
    DEFAULT_ITERATE_PHRASES.iter().map(|p| p.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_header_line() -> usize {
    2
}

fn default_data_start() -> usize {
    3
}
