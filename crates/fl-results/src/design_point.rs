//! Workbench project layout.
//!
//! A project `<root>/<name>` keeps its case folders under `<name>_files`:
//!
//! ```text
//! <name>_files/dp0/FFF/.../*.out                   report files
//! <name>_files/progress_files/dp0/FFF/.../*.trn    solution transcripts
//! ```
//!
//! Design point folders contain `dp` in their name and Fluent folders contain
//! `FFF`.

use std::fs;
use std::path::{Path, PathBuf};

use fl_core::CaseTable;
use fl_files::{ReportOptions, SolutionOptions};
use tracing::{debug, warn};

use crate::{ReportFilesOut, ResultsError, ResultsResult, SolutionFiles};

pub const DP_TAG: &str = "dp";
pub const FLUENT_TAG: &str = "FFF";
pub const PROGRESS_DIR: &str = "progress_files";
pub const REPORT_EXT: &str = "out";
pub const SOLUTION_EXT: &str = "trn";

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Sorted sub-directories of `dir` whose name contains `tag`.
fn tagged_dirs(dir: &Path, tag: &str) -> ResultsResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() && file_name(&path).contains(tag) {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Every file below `dir` with extension `ext`, sorted. A missing directory
/// has no files.
fn files_with_ext(dir: &Path, ext: &str) -> ResultsResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    if !dir.is_dir() {
        return Ok(found);
    }
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|e| e == ext) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbenchProject {
    root: PathBuf,
    name: String,
}

impl WorkbenchProject {
    /// `root` is the project directory, the parent of `<name>_files`.
    pub fn new(root: impl Into<PathBuf>) -> ResultsResult<Self> {
        let root = root.into();
        let name = file_name(&root);
        if name.is_empty() {
            return Err(ResultsError::InvalidPath {
                message: format!("{} does not name a project", root.display()),
            });
        }
        Ok(Self { root, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn files_dir(&self) -> PathBuf {
        self.root.join(format!("{}_files", self.name))
    }

    pub fn progress_dir(&self) -> PathBuf {
        self.files_dir().join(PROGRESS_DIR)
    }

    pub fn design_points(&self) -> ResultsResult<Vec<DesignPointFolder>> {
        let dirs = tagged_dirs(&self.files_dir(), DP_TAG)?;
        Ok(dirs
            .into_iter()
            .filter(|d| file_name(d) != PROGRESS_DIR)
            .map(DesignPointFolder::new)
            .collect())
    }
}

/// `<name>_files/dpN` and its twin under `progress_files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignPointFolder {
    root: PathBuf,
    progress_root: PathBuf,
}

impl DesignPointFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = file_name(&root);
        let progress_root = root
            .parent()
            .map(|files| files.join(PROGRESS_DIR).join(&name))
            .unwrap_or_default();
        Self {
            root,
            progress_root,
        }
    }

    pub fn name(&self) -> String {
        file_name(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn progress_root(&self) -> &Path {
        &self.progress_root
    }

    pub fn fluent_folders(&self) -> ResultsResult<Vec<FluentFolder>> {
        Ok(tagged_dirs(&self.root, FLUENT_TAG)?
            .into_iter()
            .map(|root| {
                let progress_root = self.progress_root.join(file_name(&root));
                FluentFolder {
                    root,
                    progress_root,
                }
            })
            .collect())
    }
}

/// One Fluent system inside a design point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FluentFolder {
    root: PathBuf,
    progress_root: PathBuf,
}

impl FluentFolder {
    pub fn name(&self) -> String {
        file_name(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn report_files(&self) -> ResultsResult<Vec<PathBuf>> {
        files_with_ext(&self.root, REPORT_EXT)
    }

    pub fn solution_files(&self) -> ResultsResult<Vec<PathBuf>> {
        files_with_ext(&self.progress_root, SOLUTION_EXT)
    }
}

/// A design point ready to load as inputs `X` and responses `Y`.
pub struct DesignPoint {
    folder: DesignPointFolder,
    solution: SolutionOptions,
    report: ReportOptions,
    parallel: bool,
}

impl DesignPoint {
    pub fn new(folder: DesignPointFolder) -> Self {
        Self {
            folder,
            solution: SolutionOptions::default(),
            report: ReportOptions::default(),
            parallel: false,
        }
    }

    pub fn with_options(mut self, solution: SolutionOptions, report: ReportOptions) -> Self {
        self.solution = solution;
        self.report = report;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn folder(&self) -> &DesignPointFolder {
        &self.folder
    }

    /// Fluent folders holding exactly one report file and exactly one
    /// transcript, as `(folder name, report, transcript)`.
    pub fn cases(&self) -> ResultsResult<Vec<(String, PathBuf, PathBuf)>> {
        let mut cases = Vec::new();
        for folder in self.folder.fluent_folders()? {
            let mut reports = folder.report_files()?;
            let mut solutions = folder.solution_files()?;
            if reports.len() != 1 || solutions.len() != 1 {
                warn!(
                    folder = %folder.name(),
                    reports = reports.len(),
                    transcripts = solutions.len(),
                    "need exactly one report file and one transcript; folder skipped"
                );
                continue;
            }
            if let (Some(report), Some(solution)) = (reports.pop(), solutions.pop()) {
                cases.push((folder.name(), report, solution));
            }
        }
        Ok(cases)
    }

    /// Workbench parameters (`X`) and converged report values (`Y`), one
    /// row per Fluent folder.
    pub fn load(&self) -> ResultsResult<(CaseTable, CaseTable)> {
        let cases = self.cases()?;
        if cases.is_empty() {
            return Err(ResultsError::DesignPoint {
                message: format!("{}: no loadable Fluent folders", self.folder.name()),
            });
        }
        debug!(design_point = %self.folder.name(), cases = cases.len(), "loading design point");

        let solutions = SolutionFiles::with_keys(
            cases.iter().map(|(name, _, trn)| (name.clone(), trn.clone())),
        )
        .with_options(self.solution.clone())
        .parallel(self.parallel);
        let mut reports = ReportFilesOut::with_keys(
            cases.into_iter().map(|(name, out, _)| (name, out)),
        )
        .with_options(self.report.clone())
        .parallel(self.parallel);

        let x = solutions.params_frame()?;
        let y = reports.frame()?;
        Ok((x, y))
    }
}
