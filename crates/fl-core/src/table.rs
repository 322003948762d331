//! Index-keyed tables of nullable floats.
//!
//! Every parser in the workspace produces a [`Table`]: an ordered index, a set
//! of named columns and one row of cells per index entry. A cell is `None`
//! when the source held no number at that position.

use std::collections::HashSet;
use std::hash::Hash;
use std::ops::Range;

use crate::numeric::Real;
use crate::{FlError, FlResult};

/// A single value; `None` marks a missing or unparsable field.
pub type Cell = Option<Real>;

/// Iteration-indexed table (solution transcripts, report files).
pub type IterationTable = Table<i64>;

/// Position-indexed table (XY plot exports).
pub type SeriesTable = Table<Real>;

/// Row-numbered table (CFD-Post exports).
pub type RowTable = Table<usize>;

/// One row per case (aggregated results).
pub type CaseTable = Table<String>;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table<K> {
    index_name: Option<String>,
    columns: Vec<String>,
    index: Vec<K>,
    rows: Vec<Vec<Cell>>,
}

impl<K> Default for Table<K> {
    fn default() -> Self {
        Self {
            index_name: None,
            columns: Vec::new(),
            index: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl<K: Clone> Table<K> {
    /// Create an empty table with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Build a table from parallel index and row vectors.
    ///
    /// Every row must have exactly one cell per column.
    pub fn from_rows(columns: Vec<String>, index: Vec<K>, rows: Vec<Vec<Cell>>) -> FlResult<Self> {
        if index.len() != rows.len() {
            return Err(FlError::IndexOob {
                what: "table index",
                index: index.len(),
                len: rows.len(),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(FlError::RowWidth {
                    row: i,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self {
            index_name: None,
            columns,
            index,
            rows,
        })
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn set_index_name(&mut self, name: Option<String>) {
        self.index_name = name;
    }

    pub fn push_row(&mut self, key: K, row: Vec<Cell>) -> FlResult<()> {
        if row.len() != self.columns.len() {
            return Err(FlError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.index.push(key);
        self.rows.push(row);
        Ok(())
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[K] {
        &self.index
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    /// All cells of one column, in index order.
    pub fn column(&self, name: &str) -> Option<Vec<Cell>> {
        let pos = self.column_position(name)?;
        Some(self.rows.iter().map(|row| row[pos]).collect())
    }

    /// Index/value pairs of one column.
    pub fn series(&self, name: &str) -> Option<Vec<(K, Cell)>> {
        let pos = self.column_position(name)?;
        Some(
            self.index
                .iter()
                .zip(&self.rows)
                .map(|(k, row)| (k.clone(), row[pos]))
                .collect(),
        )
    }

    pub fn row(&self, i: usize) -> Option<(&K, &[Cell])> {
        Some((self.index.get(i)?, self.rows.get(i)?.as_slice()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[Cell])> {
        self.index.iter().zip(self.rows.iter().map(Vec::as_slice))
    }

    /// Copy of a contiguous range of rows; out-of-range bounds are clamped.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        Self {
            index_name: self.index_name.clone(),
            columns: self.columns.clone(),
            index: self.index[start..end].to_vec(),
            rows: self.rows[start..end].to_vec(),
        }
    }

    /// Drop the first `n` rows.
    pub fn skip_rows(&self, n: usize) -> Self {
        self.slice(n..self.len())
    }

    /// The final row as a one-row table (empty when the table is empty).
    pub fn last_row(&self) -> Self {
        self.slice(self.len().saturating_sub(1)..self.len())
    }

    /// Keep only the first `width` columns.
    pub fn truncate_columns(&mut self, width: usize) {
        if width >= self.columns.len() {
            return;
        }
        self.columns.truncate(width);
        for row in &mut self.rows {
            row.truncate(width);
        }
    }

    /// Append the rows of `other`, which must have identical columns.
    pub fn append(&mut self, other: Table<K>) -> FlResult<()> {
        if other.columns != self.columns {
            return Err(FlError::ColumnMismatch {
                expected: self.columns.clone(),
                found: other.columns,
            });
        }
        self.index.extend(other.index);
        self.rows.extend(other.rows);
        Ok(())
    }
}

impl<K: Clone + PartialEq> Table<K> {
    /// Cell at `(key, column)`, using the first row with that key.
    pub fn get(&self, key: &K, column: &str) -> Option<Cell> {
        let pos = self.column_position(column)?;
        let row = self.index.iter().position(|k| k == key)?;
        Some(self.rows[row][pos])
    }
}

impl<K: Clone + Eq + Hash> Table<K> {
    /// Remove rows whose index already appeared earlier, keeping the first
    /// occurrence. Returns the number of rows removed.
    pub fn dedup_keep_first(&mut self) -> usize {
        let mut seen = HashSet::with_capacity(self.index.len());
        let keep: Vec<bool> = self.index.iter().map(|k| seen.insert(k.clone())).collect();
        let before = self.rows.len();

        let mut flags = keep.iter();
        self.index.retain(|_| *flags.next().unwrap_or(&true));
        let mut flags = keep.iter();
        self.rows.retain(|_| *flags.next().unwrap_or(&true));

        before - self.rows.len()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn dedup_leaves_unique_keys_with_first_values(keys in prop::collection::vec(0_i64..20, 0..60)) {
            let rows: Vec<Vec<Cell>> = (0..keys.len()).map(|i| vec![Some(i as Real)]).collect();
            let mut t = Table::from_rows(vec!["v".to_string()], keys.clone(), rows).unwrap();
            t.dedup_keep_first();

            let unique: HashSet<i64> = keys.iter().copied().collect();
            prop_assert_eq!(t.len(), unique.len());
            for (k, row) in t.iter() {
                let first = keys.iter().position(|x| x == k).unwrap();
                prop_assert_eq!(row[0], Some(first as Real));
            }
        }
    }
}
