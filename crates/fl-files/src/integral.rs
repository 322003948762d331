//! Surface integral reports.
//!
//! ```text
//!                         "Surface Integral Report"
//!
//!            Area-Weighted Average
//!                 Static Temperature                  (k)
//! -------------------------------- --------------------
//!                    inlet                         300
//!                    outlet                        310
//!                 ---------------- --------------------
//!                              Net                 305
//! ```
//!
//! Columns are separated by runs of at least two spaces, since names may
//! contain single spaces.

use std::path::Path;

use fl_core::{CaseTable, FileHandle, FileSource, Real, StringSource, TextSource};
use fl_core::parse_real;
use tracing::{debug, trace};

use crate::{FilesResult, FluentFile, FormatError};

const KIND_LINE: usize = 2;
const QUANTITY_LINE: usize = 3;
const FIRST_ENTRY_LINE: usize = 5;
const NET: &str = "Net";
const SEPARATOR: &str = "----";

#[derive(Debug, Clone, PartialEq)]
pub struct IntegralEntry {
    pub boundary: String,
    pub value: Real,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceIntegral {
    /// Kind of integral, e.g. `Area-Weighted Average`.
    pub kind: String,
    /// Integrated quantity.
    pub name: String,
    pub unit: String,
    /// One entry per boundary, ending with `Net` when present.
    pub entries: Vec<IntegralEntry>,
}

impl SurfaceIntegral {
    pub fn net(&self) -> Option<Real> {
        self.entries.iter().find(|e| e.boundary == NET).map(|e| e.value)
    }

    pub fn value(&self, boundary: &str) -> Option<Real> {
        self.entries.iter().find(|e| e.boundary == boundary).map(|e| e.value)
    }

    /// Boundaries as rows, the quantity as the only column.
    pub fn to_table(&self) -> FilesResult<CaseTable> {
        let (index, rows) = self
            .entries
            .iter()
            .map(|e| (e.boundary.clone(), vec![Some(e.value)]))
            .unzip();
        let table = CaseTable::from_rows(vec![self.name.clone()], index, rows)?;
        Ok(table.with_index_name("boundary"))
    }
}

pub struct SurfaceIntegralFile<S = FileSource> {
    handle: FileHandle<S>,
}

impl SurfaceIntegralFile<FileSource> {
    pub fn open(path: impl AsRef<Path>) -> FilesResult<Self> {
        Ok(Self {
            handle: FileHandle::open(path)?,
        })
    }
}

impl SurfaceIntegralFile<StringSource> {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            handle: FileHandle::from_text(text),
        }
    }
}

impl<S: TextSource> SurfaceIntegralFile<S> {
    pub fn read(&mut self) -> FilesResult<SurfaceIntegral> {
        let file = self.handle.display_name();
        let lines = self.handle.lines()?;
        if lines.len() <= QUANTITY_LINE {
            return Err(FormatError::layout(file, "surface integral report is truncated").into());
        }

        let kind = lines[KIND_LINE].trim().to_string();
        let [name, unit] = split_columns(&lines[QUANTITY_LINE])[..] else {
            return Err(FormatError::layout(file, "expected `name  unit` on the quantity line").into());
        };
        let (name, unit) = (name.to_string(), unit.to_string());

        let mut entries = Vec::new();
        for line in lines.iter().skip(FIRST_ENTRY_LINE) {
            let [boundary, value] = split_columns(line)[..] else {
                continue;
            };
            if boundary.contains(SEPARATOR) && value.contains(SEPARATOR) {
                continue;
            }
            let Some(value) = parse_real(value) else {
                trace!(line = line.as_str(), "unreadable integral entry");
                continue;
            };
            entries.push(IntegralEntry {
                boundary: boundary.to_string(),
                value,
            });
            if boundary == NET {
                break;
            }
        }

        debug!(file = %file, entries = entries.len(), "parsed surface integral");
        Ok(SurfaceIntegral {
            kind,
            name,
            unit,
            entries,
        })
    }
}

impl FluentFile for SurfaceIntegralFile<FileSource> {
    type Options = ();
    type Output = SurfaceIntegral;

    fn open_with(path: &Path, _options: ()) -> FilesResult<Self> {
        SurfaceIntegralFile::open(path)
    }

    fn read(&mut self) -> FilesResult<SurfaceIntegral> {
        SurfaceIntegralFile::read(self)
    }
}

/// Split on runs of two or more spaces.
fn split_columns(line: &str) -> Vec<&str> {
    line.trim()
        .split("  ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "
                        \"Surface Integral Report\"

           Area-Weighted Average
                Static Temperature                  (k)
-------------------------------- --------------------
                   inlet                         300
                   outlet wall                   310
                ---------------- --------------------
                             Net                 305
                   ignored                       1
";

    #[test]
    fn reads_entries_up_to_net() {
        let mut f = SurfaceIntegralFile::from_text(REPORT.trim_start_matches('\n'));
        let r = f.read().unwrap();
        assert_eq!(r.kind, "Area-Weighted Average");
        assert_eq!(r.name, "Static Temperature");
        assert_eq!(r.unit, "(k)");
        assert_eq!(r.entries.len(), 3);
        assert_eq!(r.value("outlet wall"), Some(310.0));
        assert_eq!(r.net(), Some(305.0));
        assert_eq!(
            r.to_table().unwrap().get(&"inlet".to_string(), "Static Temperature"),
            Some(Some(300.0))
        );
    }

    #[test]
    fn table_has_one_row_per_boundary() {
        let mut f = SurfaceIntegralFile::from_text(REPORT.trim_start_matches('\n'));
        let table = f.read().unwrap().to_table().unwrap();
        assert_eq!(table.index_name(), Some("boundary"));
        assert_eq!(table.columns(), &["Static Temperature"]);
        assert_eq!(table.index(), &["inlet", "outlet wall", "Net"]);
        assert_eq!(table.get(&"Net".to_string(), "Static Temperature"), Some(Some(305.0)));

        let empty = SurfaceIntegral {
            kind: "Area".into(),
            name: "Area".into(),
            unit: "(m2)".into(),
            entries: Vec::new(),
        };
        assert!(empty.to_table().unwrap().is_empty());
    }

    #[test]
    fn split_columns_keeps_single_spaces() {
        assert_eq!(split_columns("  a b   c  "), vec!["a b", "c"]);
    }

    #[test]
    fn truncated_report_is_rejected() {
        assert!(SurfaceIntegralFile::from_text("x\ny\n").read().is_err());
    }
}
