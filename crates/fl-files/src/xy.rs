//! XY-plot exports.
//!
//! ```text
//! (title "Static Temperature")
//! (labels "Position" "Static Temperature")
//!
//! ((xy/key/label "inlet")
//! 0.0	300.0
//! 0.1	301.2
//! )
//! ((xy/key/label "outlet")
//! ...
//! ```
//!
//! All blocks are concatenated into one [`SeriesTable`] keyed by position;
//! [`NamedBlocks`] remembers which rows belong to which label.

use std::path::Path;

use fl_core::{FileHandle, FileSource, SeriesTable, StringSource, TextSource};
use fl_scan::{DelimitedOptions, coerce_delimited};
use tracing::{debug, trace};

use crate::blocks::quoted;
use crate::{FilesResult, FluentFile, FormatError, NamedBlocks};

const LABEL: &str = "((xy/key/label";
const BLOCK_END: &str = ")";
/// Lines before the first block: title, labels, blank.
const PREAMBLE_LINES: usize = 3;

pub struct XyDataFile<S = FileSource> {
    handle: FileHandle<S>,
    parsed: Option<(SeriesTable, NamedBlocks)>,
}

impl XyDataFile<FileSource> {
    pub fn open(path: impl AsRef<Path>) -> FilesResult<Self> {
        Ok(Self::from_handle(FileHandle::open(path)?))
    }
}

impl XyDataFile<StringSource> {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_handle(FileHandle::from_text(text))
    }
}

impl<S: TextSource> XyDataFile<S> {
    pub fn from_handle(handle: FileHandle<S>) -> Self {
        Self {
            handle,
            parsed: None,
        }
    }

    /// All blocks as one table.
    pub fn read(&mut self) -> FilesResult<&SeriesTable> {
        Ok(&self.parsed()?.0)
    }

    /// Block labels in file order.
    pub fn names(&mut self) -> FilesResult<Vec<String>> {
        Ok(self.parsed()?.1.names().map(str::to_string).collect())
    }

    /// Rows of the block labelled `name`.
    pub fn series(&mut self, name: &str) -> FilesResult<Option<SeriesTable>> {
        let (table, blocks) = self.parsed()?;
        Ok(blocks.range(name).map(|rows| table.slice(rows)))
    }

    fn parsed(&mut self) -> FilesResult<&(SeriesTable, NamedBlocks)> {
        let parsed = match self.parsed.take() {
            Some(parsed) => parsed,
            None => self.parse()?,
        };
        Ok(self.parsed.insert(parsed))
    }

    fn parse(&mut self) -> FilesResult<(SeriesTable, NamedBlocks)> {
        let file = self.handle.display_name();
        let lines = self.handle.lines()?;

        let title = lines
            .first()
            .and_then(|l| quoted(l))
            .ok_or_else(|| FormatError::layout(&file, "missing (title \"...\") line"))?;
        let mut table = SeriesTable::new(vec![title.to_string()]);
        let mut blocks = NamedBlocks::default();

        let mut name: Option<&str> = None;
        let mut text = String::new();
        for line in lines.iter().skip(PREAMBLE_LINES) {
            if line.contains(LABEL) {
                if let Some(prev) = name {
                    flush(&mut table, &mut blocks, prev, &text)?;
                }
                name = quoted(line);
                text.clear();
                continue;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed == BLOCK_END {
                continue;
            }
            if name.is_none() {
                trace!(line = trimmed, "data before the first label");
                continue;
            }
            text.push_str(trimmed);
            text.push('\n');
        }
        if let Some(prev) = name {
            flush(&mut table, &mut blocks, prev, &text)?;
        }

        debug!(file = %file, rows = table.len(), blocks = blocks.len(), "parsed xy file");
        Ok((table, blocks))
    }
}

fn flush(table: &mut SeriesTable, blocks: &mut NamedBlocks, name: &str, text: &str) -> FilesResult<()> {
    let start = table.len();
    let coerced = coerce_delimited(text, &DelimitedOptions::default())?;
    for row in coerced.rows {
        let Some(x) = row.first().copied().flatten() else {
            continue;
        };
        table.push_row(x, vec![row.get(1).copied().flatten()])?;
    }
    blocks.push(name, start..table.len());
    Ok(())
}

impl FluentFile for XyDataFile<FileSource> {
    type Options = ();
    type Output = SeriesTable;

    fn open_with(path: &Path, _options: ()) -> FilesResult<Self> {
        XyDataFile::open(path)
    }

    fn read(&mut self) -> FilesResult<SeriesTable> {
        XyDataFile::read(self).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XY: &str = "(title \"Static Temperature\")\n(labels \"Position\" \"Static Temperature\")\n\n((xy/key/label \"inlet\")\n0\t300\n0.5\t301\n)\n\n((xy/key/label \"outlet\")\n1\t310\n)\n";

    #[test]
    fn blocks_are_concatenated_and_named() {
        let mut f = XyDataFile::from_text(XY);
        let t = f.read().unwrap().clone();
        assert_eq!(t.columns(), &["Static Temperature".to_string()]);
        assert_eq!(t.index(), &[0.0, 0.5, 1.0]);
        assert_eq!(f.names().unwrap(), vec!["inlet", "outlet"]);

        let outlet = f.series("outlet").unwrap().unwrap();
        assert_eq!(outlet.len(), 1);
        assert_eq!(outlet.rows()[0], vec![Some(310.0)]);
        assert!(f.series("wall").unwrap().is_none());
    }

    #[test]
    fn missing_title_is_a_layout_error() {
        let err = XyDataFile::from_text("no title\n").read().map(|_| ()).unwrap_err();
        assert!(matches!(err, crate::FilesError::Format(FormatError::Layout { .. })));
    }
}
