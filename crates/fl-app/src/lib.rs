//! Shared application service layer for fluentio.
//!
//! Frontends go through this crate for settings resolution, parsing (with the
//! optional parse cache), aggregation queries and CSV export.

pub mod error;
pub mod export;
pub mod parse_service;
pub mod query;
pub mod settings;

pub use error::{AppError, AppResult};
pub use export::{table_to_csv, write_table};
pub use parse_service::{
    ParseKind, ParsedTable, SurfaceView, parse_report, parse_solution, read_integral, read_params,
    read_post, read_surface, read_xy, solution_status,
};
pub use query::{
    ColumnSummary, aggregate_reports, aggregate_solutions, cases_frame, cases_variable,
    load_design_point, params_frame, select_columns, summarize,
};
pub use settings::{SETTINGS_ENV, report_options, resolve_settings, scan_mode, solution_options};
