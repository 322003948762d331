//! Single-file parsing with the optional parse cache.

use std::path::Path;

use fl_config::Settings;
use fl_core::timing::{PhaseTimings, Timer};
use fl_core::{IterationTable, RowTable, SeriesTable, Table};
use fl_files::{
    AdvisoryStatus, PostDataFile, ReportFileOut, Skip, SolutionFile, Statistic, SurfaceFile,
    SurfaceIntegral, SurfaceIntegralFile, WorkbenchParam, XyDataFile,
};
use fl_results::{CacheManifest, ParseCache, compute_entry_id};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::settings::{report_options, solution_options};

/// Parsers whose tables go through the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseKind {
    Solution,
    Report,
}

impl ParseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseKind::Solution => "solution",
            ParseKind::Report => "report",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub table: IterationTable,
    /// Cache entry id; `None` when the cache is disabled.
    pub id: Option<String>,
    pub loaded_from_cache: bool,
    pub timings: PhaseTimings,
}

/// Residual history of a solution transcript.
pub fn parse_solution(path: &Path, settings: &Settings) -> AppResult<ParsedTable> {
    let key = (&settings.scan, &settings.solution);
    cached_parse(path, settings, ParseKind::Solution, &key, || {
        let mut file = SolutionFile::open(path, solution_options(settings))?;
        let table = file.read()?.clone();
        Ok((table, file.timings().clone()))
    })
}

/// Report file table with the given skip policy.
pub fn parse_report(path: &Path, settings: &Settings, skip: Skip) -> AppResult<ParsedTable> {
    let key = (&settings.report, skip_key(skip));
    cached_parse(path, settings, ParseKind::Report, &key, || {
        let mut timings = PhaseTimings::default();
        let timer = Timer::start("read");
        let table = ReportFileOut::open(path, report_options(settings).with_skip(skip))?.read()?;
        timings.record(timer);
        Ok((table, timings))
    })
}

fn skip_key(skip: Skip) -> String {
    match skip {
        Skip::None => "none".to_string(),
        Skip::Rows(k) => format!("rows:{k}"),
        Skip::Converged => "converged".to_string(),
    }
}

fn open_cache(path: &Path, settings: &Settings) -> AppResult<Option<ParseCache>> {
    if !settings.cache.enabled {
        return Ok(None);
    }
    let cache = match &settings.cache.dir {
        Some(dir) => ParseCache::new(dir.clone())?,
        None => ParseCache::for_file(path)?,
    };
    Ok(Some(cache))
}

fn cached_parse<K, P>(
    path: &Path,
    settings: &Settings,
    kind: ParseKind,
    key: &K,
    parse: P,
) -> AppResult<ParsedTable>
where
    K: Serialize,
    P: FnOnce() -> AppResult<(IterationTable, PhaseTimings)>,
{
    let Some(cache) = open_cache(path, settings)? else {
        let (table, timings) = parse()?;
        return Ok(ParsedTable {
            table,
            id: None,
            loaded_from_cache: false,
            timings,
        });
    };

    let contents = std::fs::read(path)?;
    let id = compute_entry_id(&contents, kind.as_str(), key);

    if cache.has(&id) {
        match cache.load::<i64>(&id) {
            Ok(table) => {
                debug!(%id, file = %path.display(), "loaded table from cache");
                return Ok(ParsedTable {
                    table,
                    id: Some(id),
                    loaded_from_cache: true,
                    timings: PhaseTimings::default(),
                });
            }
            Err(e) => warn!(%id, error = %e, "unreadable cache entry; parsing again"),
        }
    }

    let (table, timings) = parse()?;
    let manifest = CacheManifest::new(&id, path, kind.as_str(), table.len());
    cache.save(&manifest, &table)?;
    Ok(ParsedTable {
        table,
        id: Some(id),
        loaded_from_cache: false,
        timings,
    })
}

pub fn solution_status(path: &Path, settings: &Settings) -> AppResult<AdvisoryStatus> {
    Ok(SolutionFile::open(path, solution_options(settings))?.status()?)
}

pub fn read_params(path: &Path, settings: &Settings) -> AppResult<Vec<WorkbenchParam>> {
    Ok(SolutionFile::open(path, solution_options(settings))?.read_params()?)
}

/// The whole XY export, or only the block labelled `name`.
pub fn read_xy(path: &Path, name: Option<&str>) -> AppResult<SeriesTable> {
    let mut file = XyDataFile::open(path)?;
    match name {
        None => Ok(file.read()?.clone()),
        Some(name) => file.series(name)?.ok_or_else(|| {
            AppError::InvalidInput(format!("no XY series named {name:?} in {}", path.display()))
        }),
    }
}

/// The whole CFD-Post export, or only the block named `name`.
pub fn read_post(path: &Path, name: Option<&str>) -> AppResult<RowTable> {
    let mut file = PostDataFile::open(path)?;
    match name {
        None => Ok(file.read()?.clone()),
        Some(name) => file.block(name)?.ok_or_else(|| {
            AppError::InvalidInput(format!("no block named {name:?} in {}", path.display()))
        }),
    }
}

/// What to extract from a surface export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceView {
    /// Every row, indexed by cell number.
    Rows,
    /// Single-row surfaces stacked into one table.
    Points,
    /// Coordinate means plus `statistic` over the field variables of each
    /// surface.
    Statistic {
        statistic: Statistic,
        dimension: usize,
    },
}

pub fn read_surface(path: &Path, view: SurfaceView) -> AppResult<Table<i64>> {
    let mut file = SurfaceFile::open(path)?;
    let table = match view {
        SurfaceView::Rows => file.read()?.clone(),
        SurfaceView::Points => reindex(file.point_data()?)?,
        SurfaceView::Statistic {
            statistic,
            dimension,
        } => reindex(file.sphere_statistic(statistic, dimension)?)?,
    };
    Ok(table)
}

/// Surface tables are numbered from 0; keep the numbering under an `i64`
/// index so every view exports the same way.
fn reindex(table: Table<usize>) -> AppResult<Table<i64>> {
    let index = table
        .index()
        .iter()
        .map(|&key| {
            i64::try_from(key)
                .map_err(|_| AppError::InvalidInput(format!("surface row {key} is out of range")))
        })
        .collect::<AppResult<Vec<_>>>()?;
    let mut out = Table::from_rows(table.columns().to_vec(), index, table.rows().to_vec())?;
    out.set_index_name(table.index_name().map(str::to_string));
    Ok(out)
}

pub fn read_integral(path: &Path) -> AppResult<SurfaceIntegral> {
    Ok(SurfaceIntegralFile::open(path)?.read()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_keys_are_distinct() {
        assert_ne!(skip_key(Skip::None), skip_key(Skip::Converged));
        assert_ne!(skip_key(Skip::Rows(1)), skip_key(Skip::Rows(2)));
    }

    #[test]
    fn reindex_keeps_rows() {
        let table = Table::from_rows(
            vec!["a".to_string()],
            vec![0usize, 1],
            vec![vec![Some(1.0)], vec![None]],
        )
        .unwrap()
        .with_index_name("surface");
        let out = reindex(table).unwrap();
        assert_eq!(out.index(), &[0, 1]);
        assert_eq!(out.index_name(), Some("surface"));
        assert_eq!(out.get(&1, "a"), Some(None));
    }
}
