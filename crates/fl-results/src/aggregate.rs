//! Aggregation over one file per case.
//!
//! A [`CaseFiles`] holds a list of `(case key, path)` pairs and a parser type.
//! Files are opened one at a time (or on the rayon pool when `parallel` is
//! set), read into an [`IterationTable`] and closed again.

use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use fl_core::{CaseTable, Cell, IterationTable};
use fl_files::{FluentFile, ReportFileOut, SolutionFile, WorkbenchParam};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{ResultsError, ResultsResult};

/// How much of each file [`CaseFiles::load`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Only the final row.
    Converged,
    #[default]
    Full,
}

pub type ReportFilesOut = CaseFiles<ReportFileOut>;
pub type SolutionFiles = CaseFiles<SolutionFile>;

type Loaded = Vec<(String, IterationTable)>;

pub struct CaseFiles<F: FluentFile> {
    cases: Vec<(String, PathBuf)>,
    options: F::Options,
    parallel: bool,
    data: Option<(LoadMode, Loaded)>,
    _parser: PhantomData<fn() -> F>,
}

impl<F> CaseFiles<F>
where
    F: FluentFile<Output = IterationTable>,
{
    /// One case per path, keyed by the path as displayed.
    pub fn new<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self::with_keys(paths.into_iter().map(|p| {
            let path = p.as_ref().to_path_buf();
            (path.display().to_string(), path)
        }))
    }

    pub fn with_keys(cases: impl IntoIterator<Item = (String, PathBuf)>) -> Self {
        Self {
            cases: cases.into_iter().collect(),
            options: F::Options::default(),
            parallel: false,
            data: None,
            _parser: PhantomData,
        }
    }

    pub fn with_options(mut self, options: F::Options) -> Self {
        self.options = options;
        self.data = None;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|(key, _)| key.as_str())
    }

    pub fn path(&self, key: &str) -> Option<&Path> {
        self.cases
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p.as_path())
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Parse every case, replacing anything loaded before.
    pub fn load(&mut self, mode: LoadMode) -> ResultsResult<()> {
        let mut tables = self.parse_all()?;
        if mode == LoadMode::Converged {
            for (_, table) in &mut tables {
                *table = table.last_row();
            }
        }
        debug!(cases = tables.len(), ?mode, "loaded case files");
        self.data = Some((mode, tables));
        Ok(())
    }

    /// Loaded tables in case order; loads full tables on first use.
    pub fn data(&mut self) -> ResultsResult<&[(String, IterationTable)]> {
        if self.data.is_none() {
            self.load(LoadMode::Full)?;
        }
        Ok(self.data.as_ref().map_or(&[][..], |(_, tables)| tables.as_slice()))
    }

    pub fn get(&mut self, key: &str) -> ResultsResult<&IterationTable> {
        self.data()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, table)| table)
            .ok_or_else(|| ResultsError::CaseNotFound {
                case: key.to_string(),
            })
    }

    /// Sorted union of the column names of every case.
    pub fn columns(&mut self) -> ResultsResult<Vec<String>> {
        let names: BTreeSet<&String> = self
            .data()?
            .iter()
            .flat_map(|(_, table)| table.columns())
            .collect();
        Ok(names.into_iter().cloned().collect())
    }

    /// One variable from every case, aligned on iteration.
    ///
    /// The index is the sorted union of the iterations of all included
    /// cases and there is one column per case. A case without the variable
    /// fails the call unless `ignore_missing` is set, in which case it is
    /// left out.
    pub fn variable(&mut self, name: &str, ignore_missing: bool) -> ResultsResult<IterationTable> {
        let parsed;
        let tables: &[(String, IterationTable)] = match &self.data {
            Some((LoadMode::Full, tables)) => tables,
            _ => {
                parsed = self.parse_all()?;
                &parsed
            }
        };

        let mut keys = Vec::new();
        let mut lookups: Vec<HashMap<i64, Cell>> = Vec::new();
        for (key, table) in tables {
            let Some(series) = table.series(name) else {
                if ignore_missing {
                    debug!(case = %key, variable = name, "variable missing; case omitted");
                    continue;
                }
                return Err(ResultsError::MissingVariable {
                    variable: name.to_string(),
                    case: key.clone(),
                });
            };
            let mut lookup = HashMap::with_capacity(series.len());
            for (iteration, cell) in series {
                lookup.entry(iteration).or_insert(cell);
            }
            keys.push(key.clone());
            lookups.push(lookup);
        }

        let index: BTreeSet<i64> = lookups.iter().flat_map(|l| l.keys().copied()).collect();
        let mut out = IterationTable::new(keys);
        let index_name = tables.iter().find_map(|(_, t)| t.index_name());
        out.set_index_name(index_name.map(str::to_string));
        for iteration in index {
            let row = lookups
                .iter()
                .map(|l| l.get(&iteration).copied().flatten())
                .collect();
            out.push_row(iteration, row)?;
        }
        Ok(out)
    }

    fn parse_all(&self) -> ResultsResult<Loaded> {
        self.map_cases(|(key, path)| {
            let mut file = F::open_with(path, self.options.clone())?;
            Ok((key.clone(), file.read()?))
        })
    }

    fn map_cases<T, M>(&self, f: M) -> ResultsResult<Vec<T>>
    where
        T: Send,
        M: Fn(&(String, PathBuf)) -> ResultsResult<T> + Sync + Send,
    {
        if self.parallel {
            self.cases.par_iter().map(f).collect()
        } else {
            self.cases.iter().map(f).collect()
        }
    }
}

impl ReportFilesOut {
    /// One converged row per case; columns are the union of all variables.
    pub fn frame(&mut self) -> ResultsResult<CaseTable> {
        if self.data.is_none() {
            self.load(LoadMode::Converged)?;
        }
        let columns = self.columns()?;
        let mut frame = CaseTable::new(columns).with_index_name("case");
        for (key, table) in self.data()? {
            let Some((_, cells)) = table.row(table.len().saturating_sub(1)) else {
                warn!(case = %key, "report file has no rows; case left out of the frame");
                continue;
            };
            let row: Vec<Cell> = frame
                .columns()
                .iter()
                .map(|c| table.column_position(c).and_then(|i| cells[i]))
                .collect();
            frame.push_row(key.clone(), row)?;
        }
        Ok(frame)
    }
}

impl SolutionFiles {
    /// Workbench input parameters of every case, in case order.
    pub fn read_params(&self) -> ResultsResult<Vec<(String, Vec<WorkbenchParam>)>> {
        self.map_cases(|(key, path)| {
            let mut file = <SolutionFile as FluentFile>::open_with(path, self.options.clone())?;
            Ok((key.clone(), file.read_params()?))
        })
    }

    /// Parameters as a table with one row per case (index name `File`).
    /// Columns appear in first-seen order; absent parameters are null.
    pub fn params_frame(&self) -> ResultsResult<CaseTable> {
        let params = self.read_params()?;

        let mut columns: Vec<String> = Vec::new();
        for param in params.iter().flat_map(|(_, list)| list) {
            if !columns.contains(&param.name) {
                columns.push(param.name.clone());
            }
        }

        let mut frame = CaseTable::new(columns).with_index_name("File");
        for (key, list) in params {
            let row: Vec<Cell> = frame
                .columns()
                .iter()
                .map(|c| list.iter().find(|p| &p.name == c).map(|p| p.value))
                .collect();
            frame.push_row(key, row)?;
        }
        Ok(frame)
    }
}
