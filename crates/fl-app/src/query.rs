//! Queries over parsed tables and case collections.

use std::path::{Path, PathBuf};

use fl_config::Settings;
use fl_core::{CaseTable, IterationTable, Real, Table};
use fl_results::{DesignPoint, DesignPointFolder, ReportFilesOut, SolutionFiles};

use crate::error::{AppError, AppResult};
use crate::settings::{report_options, solution_options};

/// Per-column overview of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    /// Non-null cells.
    pub count: usize,
    pub min: Option<Real>,
    pub max: Option<Real>,
    /// Last non-null value.
    pub last: Option<Real>,
}

pub fn summarize<K: Clone>(table: &Table<K>) -> Vec<ColumnSummary> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let values: Vec<Real> = table.rows().iter().filter_map(|row| row[i]).collect();
            ColumnSummary {
                name: name.clone(),
                count: values.len(),
                min: values.iter().copied().reduce(Real::min),
                max: values.iter().copied().reduce(Real::max),
                last: values.last().copied(),
            }
        })
        .collect()
}

/// Keep only `names`, in the given order.
pub fn select_columns<K: Clone>(table: &Table<K>, names: &[String]) -> AppResult<Table<K>> {
    let positions = names
        .iter()
        .map(|n| {
            table
                .column_position(n)
                .ok_or_else(|| AppError::InvalidInput(format!("no column named {n:?}")))
        })
        .collect::<AppResult<Vec<usize>>>()?;

    let mut out = Table::new(names.to_vec());
    out.set_index_name(table.index_name().map(str::to_string));
    for (key, row) in table.iter() {
        out.push_row(key.clone(), positions.iter().map(|&p| row[p]).collect())?;
    }
    Ok(out)
}

pub fn aggregate_reports(paths: &[PathBuf], settings: &Settings) -> ReportFilesOut {
    ReportFilesOut::new(paths)
        .with_options(report_options(settings))
        .parallel(settings.aggregate.parallel)
}

pub fn aggregate_solutions(paths: &[PathBuf], settings: &Settings) -> SolutionFiles {
    SolutionFiles::new(paths)
        .with_options(solution_options(settings))
        .parallel(settings.aggregate.parallel)
}

/// Converged report values, one row per file.
pub fn cases_frame(paths: &[PathBuf], settings: &Settings) -> AppResult<CaseTable> {
    Ok(aggregate_reports(paths, settings).frame()?)
}

/// One report variable across files, aligned on iteration.
pub fn cases_variable(paths: &[PathBuf], settings: &Settings, name: &str) -> AppResult<IterationTable> {
    Ok(aggregate_reports(paths, settings).variable(name, settings.aggregate.ignore_missing)?)
}

/// Workbench parameters, one row per transcript.
pub fn params_frame(paths: &[PathBuf], settings: &Settings) -> AppResult<CaseTable> {
    Ok(aggregate_solutions(paths, settings).params_frame()?)
}

/// Inputs and responses of the design point folder at `path`.
pub fn load_design_point(path: &Path, settings: &Settings) -> AppResult<(CaseTable, CaseTable)> {
    if !path.is_dir() {
        return Err(AppError::InvalidInput(format!(
            "{} is not a design point folder",
            path.display()
        )));
    }
    let dp = DesignPoint::new(DesignPointFolder::new(path))
        .with_options(solution_options(settings), report_options(settings))
        .parallel(settings.aggregate.parallel);
    Ok(dp.load()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> IterationTable {
        Table::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![1, 2, 3],
            vec![
                vec![Some(3.0), None],
                vec![Some(1.0), None],
                vec![Some(2.0), Some(5.0)],
            ],
        )
        .unwrap()
        .with_index_name("iter")
    }

    #[test]
    fn summary_ignores_nulls() {
        let summary = summarize(&table());
        assert_eq!(summary[0].count, 3);
        assert_eq!(summary[0].min, Some(1.0));
        assert_eq!(summary[0].max, Some(3.0));
        assert_eq!(summary[0].last, Some(2.0));
        assert_eq!(summary[1].count, 1);
        assert_eq!(summary[1].min, Some(5.0));
    }

    #[test]
    fn select_reorders_and_rejects_unknown() {
        let selected = select_columns(&table(), &["b".to_string(), "a".to_string()]).unwrap();
        assert_eq!(selected.columns(), &["b", "a"]);
        assert_eq!(selected.get(&3, "b"), Some(Some(5.0)));
        assert_eq!(selected.index_name(), Some("iter"));

        assert!(select_columns(&table(), &["c".to_string()]).is_err());
    }
}
