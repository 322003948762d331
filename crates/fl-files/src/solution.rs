//! Solution transcripts (`.trn`).
//!
//! The residual history sits between the first `  iter  ` header and the
//! first `Writing "| gzip ...` line. In between, Fluent interleaves repeated
//! headers, `!` messages, prompts and the `time/iter` annotation at the end of
//! every data row. Parsing happens in four phases:
//!
//! 1. scan for the history text,
//! 2. clean it into whitespace-delimited numeric rows,
//! 3. coerce the rows into nullable floats,
//! 4. build an [`IterationTable`], deduplicated by iteration number.

use std::path::Path;

use fl_core::timing::{PhaseTimings, Timer};
use fl_core::{FileHandle, FileSource, IterationTable, Real, StringSource, TextSource};
use fl_core::{parse_real, real_to_index};
use fl_scan::{
    BufferedScanner, DEFAULT_CHUNK_SIZE, DelimitedOptions, PhrasePair, RepeatedPhrase, ScanMode,
    coerce_delimited,
};
use regex::Regex;
use tracing::{debug, trace, warn};

use crate::{FilesResult, FluentFile, FormatError};

pub const DEFAULT_START_PHRASE: &str = "  iter  ";
/// Regex for the line that ends the residual history: the compressed data
/// write at the end of a run.
///
/// The pipe is escaped. Unescaped, `Writing "| gzip -2cf >` is an alternation
/// that also matches a bare `Writing "`, so the history would stop at the
/// first autosave or case write instead of running on to the final data
/// write.
pub const DEFAULT_END_PHRASE: &str = r#"Writing "\| gzip -2cf >"#;
pub const DEFAULT_ITERATE_PHRASES: [&str; 4] =
    ["> solve/iterate", "solve/iterate", "> iterate", "iterate"];

/// Prefix of the lines Workbench writes for each input parameter.
pub const PARAM_PHRASE: &str = "WB->Fluent:Parameter name:";

#[derive(Debug, Clone, PartialEq)]
pub struct SolutionOptions {
    pub start_phrase: String,
    pub end_phrase: String,
    pub iterate_phrases: Vec<String>,
    /// Fail on the first line that is neither data nor known noise.
    pub strict: bool,
    /// Stop at the first `>` prompt line instead of skipping it.
    pub stop_at_prompt: bool,
    pub chunk_size: usize,
    pub scan_mode: ScanMode,
}

impl Default for SolutionOptions {
    fn default() -> Self {
        Self {
            start_phrase: DEFAULT_START_PHRASE.to_string(),
            end_phrase: DEFAULT_END_PHRASE.to_string(),
            iterate_phrases: DEFAULT_ITERATE_PHRASES.iter().map(|p| p.to_string()).collect(),
            strict: false,
            stop_at_prompt: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            scan_mode: ScanMode::Buffered,
        }
    }
}

impl SolutionOptions {
    fn scanner(&self) -> FilesResult<BufferedScanner> {
        Ok(BufferedScanner::new(self.chunk_size, self.scan_mode)?)
    }
}

/// Whether the run reached the iteration count it was asked for.
///
/// This is a heuristic: the requested count is summed from the iterate
/// commands echoed in the transcript, which miscounts restarted and
/// journal-driven runs. Treat it as a hint only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvisoryStatus {
    pub complete: bool,
    /// `None` when no iterate command was found.
    pub requested_iterations: Option<i64>,
    pub parsed_rows: usize,
}

/// One `WB->Fluent:Parameter` line.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbenchParam {
    pub name: String,
    pub value: Real,
}

pub struct SolutionFile<S = FileSource> {
    handle: FileHandle<S>,
    options: SolutionOptions,
    table: Option<IterationTable>,
    timings: PhaseTimings,
}

impl SolutionFile<FileSource> {
    pub fn open(path: impl AsRef<Path>, options: SolutionOptions) -> FilesResult<Self> {
        Ok(Self::from_handle(FileHandle::open(path)?, options))
    }
}

impl SolutionFile<StringSource> {
    pub fn from_text(text: impl Into<String>, options: SolutionOptions) -> Self {
        Self::from_handle(FileHandle::from_text(text), options)
    }
}

impl<S: TextSource> SolutionFile<S> {
    pub fn from_handle(handle: FileHandle<S>, options: SolutionOptions) -> Self {
        Self {
            handle,
            options,
            table: None,
            timings: PhaseTimings::default(),
        }
    }

    pub fn options(&self) -> &SolutionOptions {
        &self.options
    }

    pub fn handle_mut(&mut self) -> &mut FileHandle<S> {
        &mut self.handle
    }

    /// Phase timings of the last parse (empty unless timing is enabled).
    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    /// Parse the residual history. The table is cached after the first call.
    pub fn read(&mut self) -> FilesResult<&IterationTable> {
        let table = match self.table.take() {
            Some(table) => table,
            None => self.parse()?,
        };
        Ok(self.table.insert(table))
    }

    /// Drop the cached table so the next [`read`](Self::read) parses again.
    pub fn invalidate(&mut self) {
        self.table = None;
    }

    fn parse(&mut self) -> FilesResult<IterationTable> {
        let file = self.handle.display_name();
        let mut timings = PhaseTimings::default();

        let timer = Timer::start("scan");
        let pair = PhrasePair::new(&self.options.start_phrase, &self.options.end_phrase, true)?;
        let scanner = self.options.scanner()?;
        let text = scanner.scan(self.handle.rewound()?, &pair)?;
        timings.record(timer);

        let mut lines = text.lines();
        let header_line = lines.next().unwrap_or_default().trim();
        let mut header: Vec<&str> = header_line.split_whitespace().collect();
        // trailing time/iter column
        header.pop();
        if header.is_empty() {
            return Err(FormatError::NotSolutionFile { file }.into());
        }

        let timer = Timer::start("clean");
        let end = Regex::new(&self.options.end_phrase).ok();
        let cleaner = LineCleaner {
            file: &file,
            header_line,
            end: end.as_ref(),
            strict: self.options.strict,
            stop_at_prompt: self.options.stop_at_prompt,
        };
        let cleaned = cleaner.clean(lines)?;
        timings.record(timer);

        let timer = Timer::start("coerce");
        let coerced = coerce_delimited(&cleaned, &DelimitedOptions::default())?;
        timings.record(timer);

        let timer = Timer::start("build");
        let index_name = header[0];
        let mut names: Vec<String> = header[1..].iter().map(|s| s.to_string()).collect();
        let data_width = coerced.width.saturating_sub(1);
        if names.len() > data_width && !coerced.is_empty() {
            warn!(
                file = %file,
                header = names.len(),
                data = data_width,
                "transcript rows are narrower than the header; dropping trailing names"
            );
            names.truncate(data_width);
        }
        let width = names.len();
        if data_width > width {
            warn!(
                file = %file,
                header = width,
                data = data_width,
                "transcript rows are wider than the header; dropping extra values"
            );
        }

        let mut table = IterationTable::new(names).with_index_name(index_name);
        for row in coerced.rows {
            let Some(iter) = row.first().copied().flatten().and_then(real_to_index) else {
                trace!(file = %file, "row without an iteration number");
                continue;
            };
            let mut values: Vec<_> = row.into_iter().skip(1).take(width).collect();
            values.resize(width, None);
            table.push_row(iter, values)?;
        }

        let removed = table.dedup_keep_first();
        if removed > 0 {
            debug!(file = %file, removed, "dropped repeated iterations");
        }
        timings.record(timer);

        debug!(file = %file, rows = table.len(), columns = table.width(), "parsed transcript");
        self.timings = timings;
        Ok(table)
    }

    /// Advisory completion check; see [`AdvisoryStatus`].
    pub fn status(&mut self) -> FilesResult<AdvisoryStatus> {
        let text = self.handle.read_all()?;
        let requested = requested_iterations(&text, &self.options.iterate_phrases);
        let parsed_rows = self.read()?.len();
        Ok(AdvisoryStatus {
            complete: requested == Some(parsed_rows as i64),
            requested_iterations: requested,
            parsed_rows,
        })
    }

    /// Input parameters Workbench wrote at the top of the transcript, in
    /// file order.
    pub fn read_params(&mut self) -> FilesResult<Vec<WorkbenchParam>> {
        let search = RepeatedPhrase::new(PARAM_PHRASE)?;
        let scanner = self.options.scanner()?;
        let block = scanner.scan(self.handle.rewound()?, &search)?;
        let params: Vec<WorkbenchParam> = block
            .lines()
            .filter_map(|line| {
                let param = parse_param_line(line);
                if param.is_none() {
                    trace!(line, "unreadable parameter line");
                }
                param
            })
            .collect();
        debug!(file = %self.handle.display_name(), count = params.len(), "read parameters");
        Ok(params)
    }
}

impl FluentFile for SolutionFile<FileSource> {
    type Options = SolutionOptions;
    type Output = IterationTable;

    fn open_with(path: &Path, options: SolutionOptions) -> FilesResult<Self> {
        SolutionFile::open(path, options)
    }

    fn read(&mut self) -> FilesResult<IterationTable> {
        SolutionFile::read(self).cloned()
    }
}

struct LineCleaner<'a> {
    file: &'a str,
    header_line: &'a str,
    end: Option<&'a Regex>,
    strict: bool,
    stop_at_prompt: bool,
}

impl LineCleaner<'_> {
    /// Reduce the scanned history to one numeric row per line.
    fn clean<'t>(&self, lines: impl Iterator<Item = &'t str>) -> FilesResult<String> {
        let header: Vec<&str> = self.header_line.split_whitespace().collect();
        let mut cleaned = String::new();

        // line numbers are relative to the header line
        for (n, raw) in lines.enumerate() {
            let line_no = n + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('!') || line.contains("Solution") {
                continue;
            }
            if line.starts_with('>') {
                if self.stop_at_prompt {
                    break;
                }
                continue;
            }
            if line.split_whitespace().eq(header.iter().copied()) {
                continue;
            }
            if self.end.is_some_and(|re| re.is_match(line)) {
                continue;
            }

            let data = if line.starts_with(|c: char| c.is_ascii_digit()) {
                strip_annotation(line)
            } else {
                None
            };
            match data {
                Some(data) => {
                    cleaned.push_str(data);
                    cleaned.push('\n');
                }
                None if self.strict => {
                    return Err(FormatError::MalformedLine {
                        file: self.file.to_string(),
                        line_no,
                        line: line.to_string(),
                    }
                    .into());
                }
                None => trace!(line_no, line, "skipping transcript line"),
            }
        }
        Ok(cleaned)
    }
}

/// Remove the `time/iter` annotation from a data row.
///
/// The annotation starts at the whitespace before the first `:`; rows
/// without a `:` lose their last token instead.
fn strip_annotation(line: &str) -> Option<&str> {
    let head = match line.find(':') {
        Some(colon) => &line[..colon],
        None => line,
    };
    let cut = head.trim_end().rfind(char::is_whitespace)?;
    Some(line[..cut].trim_end())
}

/// Iterations requested by the iterate commands in `text`.
///
/// Uses the first phrase that occurs at all, sums the integers that follow
/// each occurrence on its line, starting from 1, and adds one more when there
/// are exactly two occurrences.
fn requested_iterations(text: &str, phrases: &[String]) -> Option<i64> {
    let (phrase, hits) = phrases.iter().find_map(|p| {
        let hits: Vec<usize> = text.match_indices(p.as_str()).map(|(i, _)| i).collect();
        (!hits.is_empty()).then_some((p, hits))
    })?;

    let mut total = 1;
    for start in &hits {
        let rest = &text[start + phrase.len()..];
        let line = rest.split('\n').next().unwrap_or_default();
        if let Ok(n) = line.trim().parse::<i64>() {
            total += n;
        }
    }
    if hits.len() == 2 {
        total += 1;
    }
    Some(total)
}

fn parse_param_line(line: &str) -> Option<WorkbenchParam> {
    let at = line.find(PARAM_PHRASE)?;
    let rest = &line[at + PARAM_PHRASE.len()..];
    let (name, value) = rest.split_once(", value:")?;
    let value = parse_real(value.split_whitespace().next()?)?;
    Some(WorkbenchParam {
        name: name.trim().to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_annotation_cuts_before_time_column() {
        assert_eq!(
            strip_annotation("12  1.0e-01  2.0e-02  0:00:05  488"),
            Some("12  1.0e-01  2.0e-02")
        );
        assert_eq!(strip_annotation("3 0.5 0.25 97"), Some("3 0.5 0.25"));
        assert_eq!(strip_annotation("7:00"), None);
        assert_eq!(strip_annotation("42"), None);
    }

    #[test]
    fn requested_iterations_uses_first_matching_phrase() {
        let phrases: Vec<String> = DEFAULT_ITERATE_PHRASES.iter().map(|s| s.to_string()).collect();
        let text = "> solve/iterate 10\nfoo\n> solve/iterate 5\n";
        // 1 + 10 + 5 + 1 for the pair
        assert_eq!(requested_iterations(text, &phrases), Some(17));
        assert_eq!(requested_iterations("/solve/iterate 4\n", &phrases), Some(5));
        assert_eq!(requested_iterations("nothing here", &phrases), None);
        assert_eq!(requested_iterations("iterate abc\n", &phrases), Some(1));
    }

    #[test]
    fn autosave_writes_do_not_end_the_history() {
        let text = "  iter  a  time/iter\n\
                    1 1.0 0:00:01 2\n\
                    Writing \"run-1.cas.h5\"...\n\
                    2 2.0 0:00:01 1\n\
                    Writing \"| gzip -2cf > run-2.dat.gz\"...\n\
                    3 3.0 0:00:01 0\n";
        let mut file = SolutionFile::from_text(text, SolutionOptions::default());
        assert_eq!(file.read().unwrap().index(), &[1, 2]);

        let end = Regex::new(DEFAULT_END_PHRASE).unwrap();
        assert!(!end.is_match("Writing \"run-1.cas.h5\"..."));
        assert!(end.is_match("Writing \"| gzip -2cf > run-2.dat.gz\"..."));
    }

    #[test]
    fn param_line_parsing() {
        assert_eq!(
            parse_param_line("WB->Fluent:Parameter name: inlet_v , value:1.5 [m s^-1]"),
            Some(WorkbenchParam {
                name: "inlet_v".into(),
                value: 1.5
            })
        );
        assert_eq!(parse_param_line("WB->Fluent:Parameter name:x"), None);
    }
}
