use clap::{Parser, Subcommand, ValueEnum};
use fl_app::{AppError, AppResult, SurfaceView, parse_service, query, write_table};
use fl_core::Table;
use fl_core::timing::{self, PhaseTimings};
use fl_files::{Skip, Statistic};
use std::fmt::Display;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fluentio")]
#[command(about = "fluentio - read ANSYS Fluent output files into tables", long_about = None)]
struct Cli {
    /// Settings file (YAML or JSON); defaults to $FLUENTIO_SETTINGS
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Print parse phase timings to stderr
    #[arg(long, global = true)]
    timing: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Residual history of a solution transcript (.trn)
    Solution {
        path: PathBuf,
        /// Print the advisory completion status instead of the table
        #[arg(long)]
        status: bool,
        /// Print per-column min/max/last instead of the table
        #[arg(long)]
        summary: bool,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report definition file (.out)
    Report {
        path: PathBuf,
        /// Drop the first N data rows
        #[arg(long, conflicts_with = "converged")]
        skip: Option<usize>,
        /// Keep only the last row
        #[arg(long)]
        converged: bool,
        /// Only these columns, in this order
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// XY plot export
    Xy {
        path: PathBuf,
        /// Only the series with this label
        #[arg(long)]
        series: Option<String>,
        /// List the series labels
        #[arg(long)]
        list: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// CFD-Post export
    Post {
        path: PathBuf,
        /// Only the block with this name
        #[arg(long)]
        block: Option<String>,
        /// List the block names
        #[arg(long)]
        list: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Surface ASCII export
    Surface {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = SurfaceArg::Rows)]
        view: SurfaceArg,
        /// Statistic for `--view statistic`
        #[arg(long, value_enum, default_value_t = StatisticArg::Mean)]
        statistic: StatisticArg,
        /// Number of coordinate columns
        #[arg(long, default_value_t = 3)]
        dimension: usize,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Surface integral report
    Integral {
        path: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Workbench input parameters of one or more transcripts
    Params {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Converged report values (or one variable) across report files
    Cases {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Align this variable across the files instead
        #[arg(long)]
        variable: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Inputs and responses of a Workbench design point folder
    DesignPoint {
        path: PathBuf,
        /// Directory for inputs.csv and responses.csv (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a settings file
    ValidateSettings { path: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum SurfaceArg {
    Rows,
    Points,
    Statistic,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatisticArg {
    Mean,
    Min,
    Max,
    Sum,
}

impl From<StatisticArg> for Statistic {
    fn from(arg: StatisticArg) -> Self {
        match arg {
            StatisticArg::Mean => Statistic::Mean,
            StatisticArg::Min => Statistic::Min,
            StatisticArg::Max => Statistic::Max,
            StatisticArg::Sum => Statistic::Sum,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.timing {
        timing::enable_timing();
    }

    let settings_path = cli.settings.as_deref();
    debug!(settings = ?settings_path, timing = cli.timing, "fluentio starting");
    match cli.command {
        Commands::Solution {
            path,
            status,
            summary,
            output,
        } => cmd_solution(&path, settings_path, status, summary, output.as_deref()),
        Commands::Report {
            path,
            skip,
            converged,
            columns,
            output,
        } => {
            let skip = match (converged, skip) {
                (true, _) => Skip::Converged,
                (false, Some(k)) => Skip::Rows(k),
                (false, None) => Skip::None,
            };
            cmd_report(&path, settings_path, skip, &columns, output.as_deref())
        }
        Commands::Xy {
            path,
            series,
            list,
            output,
        } => cmd_xy(&path, series.as_deref(), list, output.as_deref()),
        Commands::Post {
            path,
            block,
            list,
            output,
        } => cmd_post(&path, block.as_deref(), list, output.as_deref()),
        Commands::Surface {
            path,
            view,
            statistic,
            dimension,
            output,
        } => {
            let view = match view {
                SurfaceArg::Rows => SurfaceView::Rows,
                SurfaceArg::Points => SurfaceView::Points,
                SurfaceArg::Statistic => SurfaceView::Statistic {
                    statistic: statistic.into(),
                    dimension,
                },
            };
            let table = parse_service::read_surface(&path, view)?;
            emit(&table, output.as_deref())
        }
        Commands::Integral { path, output } => {
            let integral = parse_service::read_integral(&path)?;
            eprintln!("{} of {} [{}]", integral.kind, integral.name, integral.unit);
            emit(&integral.to_table()?, output.as_deref())
        }
        Commands::Params { paths, output } => {
            let settings = fl_app::resolve_settings(settings_path)?;
            emit(&query::params_frame(&paths, &settings)?, output.as_deref())
        }
        Commands::Cases {
            paths,
            variable,
            output,
        } => {
            let settings = fl_app::resolve_settings(settings_path)?;
            match variable {
                Some(name) => emit(
                    &query::cases_variable(&paths, &settings, &name)?,
                    output.as_deref(),
                ),
                None => emit(&query::cases_frame(&paths, &settings)?, output.as_deref()),
            }
        }
        Commands::DesignPoint { path, output } => {
            cmd_design_point(&path, settings_path, output.as_deref())
        }
        Commands::ValidateSettings { path } => cmd_validate_settings(&path),
    }
}

fn cmd_solution(
    path: &Path,
    settings_path: Option<&Path>,
    status: bool,
    summary: bool,
    output: Option<&Path>,
) -> AppResult<()> {
    let settings = fl_app::resolve_settings(settings_path)?;

    if status {
        let status = parse_service::solution_status(path, &settings)?;
        let requested = status
            .requested_iterations
            .map_or_else(|| "unknown".to_string(), |n| n.to_string());
        println!("File:       {}", path.display());
        println!("Requested:  {}", requested);
        println!("Parsed:     {}", status.parsed_rows);
        println!(
            "Complete:   {} (advisory)",
            if status.complete { "yes" } else { "no" }
        );
        return Ok(());
    }

    let parsed = parse_service::parse_solution(path, &settings)?;
    report_parse(&parsed.timings, parsed.loaded_from_cache, parsed.id.as_deref());

    if summary {
        print_summary(&parsed.table);
        return Ok(());
    }
    emit(&parsed.table, output)
}

fn cmd_report(
    path: &Path,
    settings_path: Option<&Path>,
    skip: Skip,
    columns: &[String],
    output: Option<&Path>,
) -> AppResult<()> {
    let settings = fl_app::resolve_settings(settings_path)?;
    let parsed = parse_service::parse_report(path, &settings, skip)?;
    report_parse(&parsed.timings, parsed.loaded_from_cache, parsed.id.as_deref());

    if columns.is_empty() {
        emit(&parsed.table, output)
    } else {
        emit(&query::select_columns(&parsed.table, columns)?, output)
    }
}

fn cmd_xy(path: &Path, series: Option<&str>, list: bool, output: Option<&Path>) -> AppResult<()> {
    if list {
        let mut file = fl_files::XyDataFile::open(path)?;
        for name in file.names()? {
            println!("{}", name);
        }
        return Ok(());
    }
    emit(&parse_service::read_xy(path, series)?, output)
}

fn cmd_post(path: &Path, block: Option<&str>, list: bool, output: Option<&Path>) -> AppResult<()> {
    if list {
        let mut file = fl_files::PostDataFile::open(path)?;
        for name in file.names()? {
            println!("{}", name);
        }
        return Ok(());
    }
    emit(&parse_service::read_post(path, block)?, output)
}

fn cmd_design_point(
    path: &Path,
    settings_path: Option<&Path>,
    output: Option<&Path>,
) -> AppResult<()> {
    let settings = fl_app::resolve_settings(settings_path)?;
    let (inputs, responses) = query::load_design_point(path, &settings)?;

    match output {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            emit(&inputs, Some(dir.join("inputs.csv").as_path()))?;
            emit(&responses, Some(dir.join("responses.csv").as_path()))
        }
        None => {
            println!("# inputs");
            emit(&inputs, None)?;
            println!();
            println!("# responses");
            emit(&responses, None)
        }
    }
}

fn cmd_validate_settings(path: &Path) -> AppResult<()> {
    println!("Validating settings: {}", path.display());
    if !path.exists() {
        return Err(AppError::InvalidInput(format!(
            "{} does not exist",
            path.display()
        )));
    }
    let settings = fl_config::load(path)?;
    println!("✓ Settings are valid (version {})", settings.version);
    Ok(())
}

fn report_parse(timings: &PhaseTimings, loaded_from_cache: bool, id: Option<&str>) {
    if let Some(id) = id {
        if loaded_from_cache {
            eprintln!("✓ Loaded from cache: {}", id);
        } else {
            eprintln!("✓ Cached as: {}", id);
        }
    }
    timings.print_summary();
}

fn print_summary<K: Clone>(table: &Table<K>) {
    let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.6e}", v));
    println!(
        "{:<24} {:>8} {:>14} {:>14} {:>14}",
        "column", "count", "min", "max", "last"
    );
    for col in query::summarize(table) {
        println!(
            "{:<24} {:>8} {:>14} {:>14} {:>14}",
            col.name,
            col.count,
            fmt(col.min),
            fmt(col.max),
            fmt(col.last)
        );
    }
}

/// Write `table` as CSV to `output`, or to stdout.
fn emit<K: Clone + Display>(table: &Table<K>, output: Option<&Path>) -> AppResult<()> {
    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            write_table(table, &mut file)?;
            eprintln!("✓ Exported {} rows to {}", table.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            write_table(table, &mut stdout.lock())?;
        }
    }
    Ok(())
}
