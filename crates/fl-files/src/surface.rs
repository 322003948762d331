//! Surface ASCII exports (`file/export/ascii`).
//!
//! A CSV with a header row whose first column is `cellnumber`. The cell
//! number restarts at 1 for every exported surface, which is the only way to
//! tell the surfaces apart.

use std::path::Path;

use fl_core::{FileHandle, FileSource, IterationTable, Real, StringSource, Table, TextSource};
use fl_core::real_to_index;
use fl_scan::{DelimitedOptions, Delimiter, coerce_delimited};
use tracing::{debug, warn};

use crate::{FilesResult, FluentFile, FormatError};

const DELIM: &str = ",";
const COORDINATES: [&str; 3] = ["x-coordinate", "y-coordinate", "z-coordinate"];

/// Summary applied to each field variable of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Mean,
    Min,
    Max,
    Sum,
}

impl Statistic {
    /// `None` when there are no values.
    pub fn apply(self, values: &[Real]) -> Option<Real> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as Real;
        Some(match self {
            Self::Mean => values.iter().sum::<Real>() / n,
            Self::Min => values.iter().copied().fold(Real::INFINITY, Real::min),
            Self::Max => values.iter().copied().fold(Real::NEG_INFINITY, Real::max),
            Self::Sum => values.iter().sum(),
        })
    }
}

pub struct SurfaceFile<S = FileSource> {
    handle: FileHandle<S>,
    table: Option<IterationTable>,
}

impl SurfaceFile<FileSource> {
    pub fn open(path: impl AsRef<Path>) -> FilesResult<Self> {
        Ok(Self::from_handle(FileHandle::open(path)?))
    }
}

impl SurfaceFile<StringSource> {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_handle(FileHandle::from_text(text))
    }
}

impl<S: TextSource> SurfaceFile<S> {
    pub fn from_handle(handle: FileHandle<S>) -> Self {
        Self {
            handle,
            table: None,
        }
    }

    /// Every row of the export, indexed by cell number.
    pub fn read(&mut self) -> FilesResult<&IterationTable> {
        let table = match self.table.take() {
            Some(table) => table,
            None => self.parse()?,
        };
        Ok(self.table.insert(table))
    }

    fn parse(&mut self) -> FilesResult<IterationTable> {
        let file = self.handle.display_name();
        let lines = self.handle.lines()?;
        let Some((header, body)) = lines.split_first() else {
            return Err(FormatError::layout(&file, "empty surface export").into());
        };

        let mut names: Vec<String> = header.split(DELIM).map(|c| c.trim().to_string()).collect();
        if names.len() < 2 {
            return Err(FormatError::layout(&file, "surface export needs an index and a value column").into());
        }
        let index_name = names.remove(0);
        let width = names.len();

        let opts = DelimitedOptions::with_delimiter(Delimiter::Literal(DELIM.to_string())).force_columns(false);
        let coerced = coerce_delimited(&body.join("\n"), &opts)?;

        let mut table = IterationTable::new(names).with_index_name(index_name);
        let mut dropped = 0;
        for row in coerced.rows {
            if row.len() > width + 1 {
                dropped += 1;
                continue;
            }
            let Some(cell) = row.first().copied().flatten().and_then(real_to_index) else {
                dropped += 1;
                continue;
            };
            let mut values: Vec<_> = row.into_iter().skip(1).collect();
            values.resize(width, None);
            table.push_row(cell, values)?;
        }
        if dropped > 0 {
            warn!(file = %file, dropped, "skipped unreadable surface rows");
        }
        debug!(file = %file, rows = table.len(), "parsed surface export");
        Ok(table)
    }

    /// One table per surface, split where the cell number restarts at 1.
    pub fn surfaces(&mut self) -> FilesResult<Vec<IterationTable>> {
        let file = self.handle.display_name();
        let table = self.read()?;
        let starts: Vec<usize> = table
            .index()
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == 1)
            .map(|(i, _)| i)
            .collect();
        if starts.is_empty() {
            return Err(FormatError::layout(file, "no row with cell number 1").into());
        }
        let ends = starts.iter().skip(1).copied().chain([table.len()]);
        Ok(starts.iter().zip(ends).map(|(&s, e)| table.slice(s..e)).collect())
    }

    /// Stack single-point surfaces into one row each.
    pub fn point_data(&mut self) -> FilesResult<Table<usize>> {
        let file = self.handle.display_name();
        let surfaces = self.surfaces()?;
        let mut out = Table::new(surfaces[0].columns().to_vec());
        for (i, surface) in surfaces.iter().enumerate() {
            let Some((_, row)) = surface.row(0).filter(|_| surface.len() == 1) else {
                return Err(FormatError::layout(
                    file,
                    format!("surface {i} has {} points, expected 1", surface.len()),
                )
                .into());
            };
            out.push_row(i, row.to_vec())?;
        }
        Ok(out)
    }

    /// One row per surface: the mean of the coordinate columns followed by
    /// `statistic` over every other column.
    ///
    /// `dimension` 3 uses x, y and z; 2 uses the first available pair of
    /// x/y, x/z and y/z.
    pub fn sphere_statistic(&mut self, statistic: Statistic, dimension: usize) -> FilesResult<Table<usize>> {
        let file = self.handle.display_name();
        let surfaces = self.surfaces()?;
        let columns = surfaces[0].columns();
        let has = |c: &str| columns.iter().any(|n| n == c);

        let coords: Vec<&str> = match dimension {
            3 => COORDINATES.to_vec(),
            2 => [[0, 1], [0, 2], [1, 2]]
                .iter()
                .map(|pair| pair.map(|i| COORDINATES[i]))
                .find(|pair| pair.iter().all(|&c| has(c)))
                .map(|pair| pair.to_vec())
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        if coords.is_empty() || !coords.iter().all(|&c| has(c)) {
            return Err(FormatError::layout(
                file,
                format!("no {dimension}-d coordinate columns in surface export"),
            )
            .into());
        }

        let fields: Vec<&String> = columns.iter().filter(|c| !COORDINATES.contains(&c.as_str())).collect();
        let mut names: Vec<String> = coords.iter().map(|c| c.to_string()).collect();
        names.extend(fields.iter().map(|c| c.to_string()));

        let mut out = Table::new(names);
        for (i, surface) in surfaces.iter().enumerate() {
            let summarise = |name: &str, stat: Statistic| {
                let values: Vec<Real> = surface.column(name).unwrap_or_default().into_iter().flatten().collect();
                stat.apply(&values)
            };
            let mut row: Vec<_> = coords.iter().map(|c| summarise(*c, Statistic::Mean)).collect();
            row.extend(fields.iter().map(|c| summarise(c.as_str(), statistic)));
            out.push_row(i, row)?;
        }
        Ok(out)
    }
}

impl FluentFile for SurfaceFile<FileSource> {
    type Options = ();
    type Output = IterationTable;

    fn open_with(path: &Path, _options: ()) -> FilesResult<Self> {
        SurfaceFile::open(path)
    }

    fn read(&mut self) -> FilesResult<IterationTable> {
        SurfaceFile::read(self).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPHERES: &str = "\
cellnumber, x-coordinate, y-coordinate, z-coordinate, temperature
1, 0.0, 0.0, 0.0, 300
2, 2.0, 0.0, 0.0, 310
1, 1.0, 1.0, 1.0, 400
2, 1.0, 3.0, 1.0, 420
3, 1.0, 2.0, 1.0, 410
";

    #[test]
    fn surfaces_split_on_restart() {
        let mut f = SurfaceFile::from_text(SPHERES);
        let t = f.read().unwrap();
        assert_eq!(t.index_name(), Some("cellnumber"));
        assert_eq!(t.columns()[3], "temperature");

        let s = f.surfaces().unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].len(), 2);
        assert_eq!(s[1].index(), &[1, 2, 3]);
    }

    #[test]
    fn sphere_statistic_means_coordinates() {
        let mut f = SurfaceFile::from_text(SPHERES);
        let t = f.sphere_statistic(Statistic::Max, 3).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(&0, "x-coordinate"), Some(Some(1.0)));
        assert_eq!(t.get(&0, "temperature"), Some(Some(310.0)));
        assert_eq!(t.get(&1, "y-coordinate"), Some(Some(2.0)));
        assert_eq!(t.get(&1, "temperature"), Some(Some(420.0)));
    }

    #[test]
    fn point_data_requires_single_rows() {
        let points = "cellnumber, x-coordinate, temperature\n1, 0.0, 300\n1, 1.0, 301\n";
        let t = SurfaceFile::from_text(points).point_data().unwrap();
        assert_eq!(t.index(), &[0, 1]);
        assert_eq!(t.rows()[1], vec![Some(1.0), Some(301.0)]);

        assert!(SurfaceFile::from_text(SPHERES).point_data().is_err());
    }

    #[test]
    fn statistic_on_empty_is_none() {
        assert_eq!(Statistic::Mean.apply(&[]), None);
        assert_eq!(Statistic::Sum.apply(&[1.0, 2.0]), Some(3.0));
    }
}
