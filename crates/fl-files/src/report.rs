//! Report definition files (`.out`).
//!
//! Layout: two title lines, a header line of quoted names, then one
//! space-delimited row per iteration or time step.

use std::path::Path;

use fl_core::{FileHandle, FileSource, FlError, IterationTable, StringSource, TextSource};
use fl_core::real_to_index;
use fl_scan::{DelimitedOptions, coerce_delimited};
use tracing::{debug, trace};

use crate::{FilesResult, FluentFile, FormatError};

/// Characters removed from every header name.
const HEADER_STRIP: [char; 4] = [')', '"', '\n', '('];

/// Which data rows to drop before building the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Skip {
    #[default]
    None,
    /// Drop the first `k` data rows.
    Rows(usize),
    /// Keep only the last row. Needs a full line count.
    Converged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Zero-based line holding the column names.
    pub header_line: usize,
    /// Zero-based line of the first data row.
    pub data_start: usize,
    pub skip: Skip,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            header_line: 2,
            data_start: 3,
            skip: Skip::None,
        }
    }
}

impl ReportOptions {
    pub fn with_skip(mut self, skip: Skip) -> Self {
        self.skip = skip;
        self
    }
}

pub struct ReportFileOut<S = FileSource> {
    handle: FileHandle<S>,
    options: ReportOptions,
}

impl ReportFileOut<FileSource> {
    pub fn open(path: impl AsRef<Path>, options: ReportOptions) -> FilesResult<Self> {
        Ok(Self {
            handle: FileHandle::open(path)?,
            options,
        })
    }
}

impl ReportFileOut<StringSource> {
    pub fn from_text(text: impl Into<String>, options: ReportOptions) -> Self {
        Self {
            handle: FileHandle::from_text(text),
            options,
        }
    }
}

impl<S: TextSource> ReportFileOut<S> {
    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    pub fn set_skip(&mut self, skip: Skip) {
        self.options.skip = skip;
    }

    pub fn line_count(&mut self) -> FilesResult<usize> {
        Ok(self.handle.line_count()?)
    }

    /// Column names from the header line; the first is the index name.
    pub fn headers(&mut self) -> FilesResult<Vec<String>> {
        let lines = self.handle.lines()?;
        self.header_from(&lines)
    }

    fn header_from(&self, lines: &[String]) -> FilesResult<Vec<String>> {
        let line = self.options.header_line;
        let names = lines
            .get(line)
            .map(|h| parse_header(h))
            .filter(|names| !names.is_empty())
            .ok_or_else(|| FormatError::NotReportFile {
                file: self.handle.display_name(),
                line,
            })?;
        Ok(names)
    }

    fn rows_to_skip(&mut self) -> FilesResult<usize> {
        Ok(match self.options.skip {
            Skip::None => 0,
            Skip::Rows(k) => k,
            Skip::Converged => self
                .handle
                .line_count()?
                .saturating_sub(self.options.data_start + 1),
        })
    }

    pub fn read(&mut self) -> FilesResult<IterationTable> {
        if self.options.header_line >= self.options.data_start {
            return Err(FlError::InvalidArg {
                what: "report header line must precede the data",
            }
            .into());
        }
        let file = self.handle.display_name();
        let lines = self.handle.lines()?;
        let mut names = self.header_from(&lines)?;
        let index_name = names.remove(0);
        let skip = self.rows_to_skip()?;

        let body = lines
            .iter()
            .skip(self.options.data_start + skip)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        let coerced = coerce_delimited(&body, &DelimitedOptions::default().force_columns(false))?;

        let width = names.len();
        let mut table = IterationTable::new(names).with_index_name(index_name);
        for (row_no, row) in coerced.rows.into_iter().enumerate() {
            let found = row.len().saturating_sub(1);
            if found > width {
                return Err(FormatError::ColumnMismatch {
                    file,
                    row: row_no,
                    expected: width,
                    found,
                }
                .into());
            }
            let Some(iter) = row.first().copied().flatten().and_then(real_to_index) else {
                trace!(file = %file, row_no, "report row without an index");
                continue;
            };
            let mut values: Vec<_> = row.into_iter().skip(1).collect();
            values.resize(width, None);
            table.push_row(iter, values)?;
        }

        debug!(file = %file, rows = table.len(), skipped = skip, "parsed report file");
        Ok(table)
    }
}

impl FluentFile for ReportFileOut<FileSource> {
    type Options = ReportOptions;
    type Output = IterationTable;

    fn open_with(path: &Path, options: ReportOptions) -> FilesResult<Self> {
        ReportFileOut::open(path, options)
    }

    fn read(&mut self) -> FilesResult<IterationTable> {
        ReportFileOut::read(self)
    }
}

/// Split a header line such as `("Time Step" "report-def-0" "flow-time")`.
fn parse_header(line: &str) -> Vec<String> {
    line.split("\" \"")
        .map(|name| name.chars().filter(|c| !HEADER_STRIP.contains(c)).collect::<String>())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\"report-def-0-rfile\"\n\"Time Step\" \"report-def-0\" \"flow-time\"\n(\"Time Step\" \"report-def-0\" \"flow-time\")\n1 0.5 0.01\n2 0.6 0.02\n3 0.7 0.03\n4 0.8 0.04\n";

    #[test]
    fn header_names_are_stripped() {
        assert_eq!(
            parse_header("(\"Time Step\" \"report-def-0\" \"flow-time\")\n"),
            vec!["Time Step", "report-def-0", "flow-time"]
        );
        assert_eq!(parse_header("\"Iter\" \"CS-Temp\""), vec!["Iter", "CS-Temp"]);
    }

    #[test]
    fn reads_all_rows_by_default() {
        let mut f = ReportFileOut::from_text(REPORT, ReportOptions::default());
        let t = f.read().unwrap();
        assert_eq!(t.index(), &[1, 2, 3, 4]);
        assert_eq!(t.index_name(), Some("Time Step"));
        assert_eq!(t.columns(), &["report-def-0".to_string(), "flow-time".to_string()]);
        assert_eq!(t.get(&3, "flow-time"), Some(Some(0.03)));
    }

    #[test]
    fn skip_modes() {
        let mut f = ReportFileOut::from_text(REPORT, ReportOptions::default().with_skip(Skip::Rows(1)));
        assert_eq!(f.read().unwrap().index(), &[2, 3, 4]);

        f.set_skip(Skip::Converged);
        let t = f.read().unwrap();
        assert_eq!(t.index(), &[4]);
        assert_eq!(t.get(&4, "report-def-0"), Some(Some(0.8)));
    }

    #[test]
    fn short_rows_are_padded_and_wide_rows_rejected() {
        let text = "t\n\n\"Iter\" \"a\" \"b\"\n1 1.0\n2 2.0 3.0\n";
        let t = ReportFileOut::from_text(text, ReportOptions::default()).read().unwrap();
        assert_eq!(t.get(&1, "b"), Some(None));

        let wide = "t\n\n\"Iter\" \"a\"\n1 1.0 2.0\n";
        let err = ReportFileOut::from_text(wide, ReportOptions::default())
            .read()
            .unwrap_err();
        assert!(matches!(
            err,
            crate::FilesError::Format(FormatError::ColumnMismatch { expected: 1, found: 2, .. })
        ));
    }

    #[test]
    fn missing_header_is_not_a_report() {
        let err = ReportFileOut::from_text("one line\n", ReportOptions::default())
            .read()
            .unwrap_err();
        assert!(matches!(
            err,
            crate::FilesError::Format(FormatError::NotReportFile { line: 2, .. })
        ));
    }
}
