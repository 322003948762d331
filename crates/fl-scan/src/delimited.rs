//! Delimited text to rows of nullable floats.
//!
//! Fluent tables are mostly regular, but transcripts are cut short by
//! restarts and crashes, which leaves ragged rows. The coercer keeps every
//! row, records whether widths disagreed, and optionally pads short rows at
//! the end.

use fl_core::{Cell, parse_real};
use regex::Regex;
use tracing::debug;

use crate::error::compile;
use crate::{ScanError, ScanResult};

/// Field separator.
#[derive(Debug, Clone)]
pub enum Delimiter {
    /// Any run of whitespace.
    Whitespace,
    /// A fixed string such as `,` or `\t`.
    Literal(String),
    /// A regular expression.
    Pattern(Regex),
}

impl Delimiter {
    pub fn pattern(pattern: &str) -> ScanResult<Self> {
        Ok(Self::Pattern(compile(pattern, "delimiter")?))
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Self::Whitespace => line.split_whitespace().collect(),
            Self::Literal(sep) => line.split(sep.as_str()).collect(),
            Self::Pattern(re) => re.split(line).collect(),
        }
    }
}

/// What to put in the trailing cells of short rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmptyColumns {
    /// No fill value: padding is a configuration error.
    Reject,
    Fill(Cell),
}

impl Default for EmptyColumns {
    fn default() -> Self {
        Self::Fill(None)
    }
}

#[derive(Debug, Clone)]
pub struct DelimitedOptions {
    pub delimiter: Delimiter,
    pub newline: String,
    /// Pad short rows to the widest row when widths disagree.
    pub force_columns: bool,
    pub empty_columns: EmptyColumns,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Whitespace,
            newline: "\n".to_string(),
            force_columns: true,
            empty_columns: EmptyColumns::default(),
        }
    }
}

impl DelimitedOptions {
    pub fn with_delimiter(delimiter: Delimiter) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    pub fn force_columns(mut self, force: bool) -> Self {
        self.force_columns = force;
        self
    }

    pub fn empty_columns(mut self, empty: EmptyColumns) -> Self {
        self.empty_columns = empty;
        self
    }

    pub fn newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }
}

/// Coerced rows plus their shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoercedRows {
    pub rows: Vec<Vec<Cell>>,
    /// Widest row seen.
    pub width: usize,
    /// True when the rows still have differing widths.
    pub ragged: bool,
}

impl CoercedRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Split `text` into rows and fields and parse every field as a float.
///
/// Fields that do not parse become `None`. Blank lines are skipped. When the
/// rows disagree in width and `force_columns` is set, short rows are padded
/// at the end with the configured fill; [`EmptyColumns::Reject`] turns that
/// case into [`ScanError::MissingFill`]. Without `force_columns` the ragged
/// rows are returned as they are and flagged.
pub fn coerce_delimited(text: &str, opts: &DelimitedOptions) -> ScanResult<CoercedRows> {
    let newline = if opts.newline.is_empty() { "\n" } else { opts.newline.as_str() };

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut width = 0;
    let mut ragged = false;

    for line in text.split(newline) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row: Vec<Cell> = opts.delimiter.split(line).into_iter().map(parse_real).collect();
        if rows.is_empty() {
            width = row.len();
        } else if row.len() != width {
            ragged = true;
            width = width.max(row.len());
        }
        rows.push(row);
    }

    if ragged && opts.force_columns {
        let fill = match opts.empty_columns {
            EmptyColumns::Fill(fill) => fill,
            EmptyColumns::Reject => return Err(ScanError::MissingFill),
        };
        let mut padded = 0;
        for row in rows.iter_mut().filter(|r| r.len() < width) {
            row.resize(width, fill);
            padded += 1;
        }
        debug!(padded, width, "padded short rows");
        ragged = false;
    }

    Ok(CoercedRows {
        rows,
        width,
        ragged,
    })
}
