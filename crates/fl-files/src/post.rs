//! CFD-Post exports.
//!
//! Each block is introduced by `[Name]` with the block name on the next line,
//! followed by `[Data]`, a comma-separated column line and comma-separated
//! rows. Every block must carry the same columns.

use std::path::Path;

use fl_core::{FileHandle, FileSource, RowTable, StringSource, TextSource};
use fl_scan::{DelimitedOptions, Delimiter, coerce_delimited};
use tracing::debug;

use crate::{FilesResult, FluentFile, FormatError, NamedBlocks};

const NAME_TAG: &str = "[Name]";
const DATA_TAG: &str = "[Data]";
const DELIM: &str = ",";

pub struct PostDataFile<S = FileSource> {
    handle: FileHandle<S>,
    parsed: Option<(RowTable, NamedBlocks)>,
}

impl PostDataFile<FileSource> {
    pub fn open(path: impl AsRef<Path>) -> FilesResult<Self> {
        Ok(Self::from_handle(FileHandle::open(path)?))
    }
}

impl PostDataFile<StringSource> {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_handle(FileHandle::from_text(text))
    }
}

impl<S: TextSource> PostDataFile<S> {
    pub fn from_handle(handle: FileHandle<S>) -> Self {
        Self {
            handle,
            parsed: None,
        }
    }

    pub fn read(&mut self) -> FilesResult<&RowTable> {
        Ok(&self.parsed()?.0)
    }

    pub fn names(&mut self) -> FilesResult<Vec<String>> {
        Ok(self.parsed()?.1.names().map(str::to_string).collect())
    }

    /// Rows of the block called `name`.
    pub fn block(&mut self, name: &str) -> FilesResult<Option<RowTable>> {
        let (table, blocks) = self.parsed()?;
        Ok(blocks.range(name).map(|rows| table.slice(rows)))
    }

    fn parsed(&mut self) -> FilesResult<&(RowTable, NamedBlocks)> {
        let parsed = match self.parsed.take() {
            Some(parsed) => parsed,
            None => self.parse()?,
        };
        Ok(self.parsed.insert(parsed))
    }

    fn parse(&mut self) -> FilesResult<(RowTable, NamedBlocks)> {
        let file = self.handle.display_name();
        let lines = self.handle.lines()?;

        // (name, body lines)
        let mut raw: Vec<(&str, Vec<&str>)> = Vec::new();
        let mut iter = lines.iter();
        while let Some(line) = iter.next() {
            if line.contains(NAME_TAG) {
                let name = iter.next().map(|n| n.trim()).unwrap_or_default();
                raw.push((name, Vec::new()));
            } else if let Some((_, body)) = raw.last_mut() {
                body.push(line);
            }
        }
        if raw.is_empty() {
            return Err(FormatError::layout(&file, "no [Name] block").into());
        }

        let mut table: Option<RowTable> = None;
        let mut blocks = NamedBlocks::default();
        for (name, body) in raw {
            let (columns, rows) = parse_block(&file, name, &body)?;
            let table = table.get_or_insert_with(|| RowTable::new(columns.clone()));
            if table.columns() != columns.as_slice() {
                return Err(FormatError::layout(
                    &file,
                    format!("block {name:?} has columns {columns:?}, expected {:?}", table.columns()),
                )
                .into());
            }
            let start = table.len();
            for row in rows {
                table.push_row(table.len(), row)?;
            }
            blocks.push(name, start..table.len());
        }

        let table = table.unwrap_or_default();
        debug!(file = %file, rows = table.len(), blocks = blocks.len(), "parsed post file");
        Ok((table, blocks))
    }
}

type BlockRows = (Vec<String>, Vec<Vec<fl_core::Cell>>);

fn parse_block(file: &str, name: &str, body: &[&str]) -> FilesResult<BlockRows> {
    let data_at = body
        .iter()
        .position(|l| l.contains(DATA_TAG))
        .ok_or_else(|| FormatError::layout(file, format!("block {name:?} has no [Data] section")))?;
    let columns: Vec<String> = body
        .get(data_at + 1)
        .map(|l| l.split(DELIM).map(|c| c.trim().to_string()).collect())
        .ok_or_else(|| FormatError::layout(file, format!("block {name:?} has no column line")))?;

    let text = body[(data_at + 2).min(body.len())..].join("\n");
    let opts = DelimitedOptions::with_delimiter(Delimiter::Literal(DELIM.to_string()));
    let mut rows = coerce_delimited(&text, &opts)?.rows;
    for row in &mut rows {
        row.resize(columns.len(), None);
    }
    Ok((columns, rows))
}

impl FluentFile for PostDataFile<FileSource> {
    type Options = ();
    type Output = RowTable;

    fn open_with(path: &Path, _options: ()) -> FilesResult<Self> {
        PostDataFile::open(path)
    }

    fn read(&mut self) -> FilesResult<RowTable> {
        PostDataFile::read(self).cloned()
    }
}
