//! CLI definition and dispatch.

use chrono::{Days, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::domain::analysis::AnalysisConfig;
use crate::domain::config_validation::build_analysis_config;
use crate::domain::error::LongbiasError;
use crate::domain::metrics::SUMMARY_HEADERS;
use crate::domain::portfolio::{evaluate_portfolio, AssetOutcome, PortfolioResult};
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(
    name = "longbias",
    about = "Cash deployment strategy comparison over historical prices"
)]
pub struct Cli {
    /// Log filter when RUST_LOG is unset (e.g. info, debug, longbias=trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate every configured strategy for every configured asset
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        /// Reference end date, YYYY-MM-DD (default: yesterday)
        #[arg(short, long)]
        date: Option<String>,
        /// Directory of <asset>.csv price files (overrides [data] dir)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Directory for CSV and HTML reports (overrides [report] output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration and list the strategy instances it defines
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the available strategy identifiers
    Strategies,
    /// List assets with a price file in the data directory
    Assets {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory of <asset>.csv price files (overrides [data] dir)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

/// Installs the stderr `tracing` subscriber. Safe to call more than once.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(&cli.log_level);
    match cli.command {
        Command::Analyze {
            config,
            date,
            data_dir,
            output,
        } => run_analyze(&config, date.as_deref(), data_dir.as_ref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Strategies => run_strategies(),
        Command::Assets { config, data_dir } => run_assets(config.as_ref(), data_dir.as_ref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = LongbiasError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        error!("{err}");
        ExitCode::from(&err)
    })
}

/// Parses `YYYY-MM-DD`, or returns yesterday when no date is given.
pub fn resolve_end_date(date: Option<&str>) -> Result<NaiveDate, LongbiasError> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            LongbiasError::ConfigInvalid {
                section: "cli".into(),
                key: "date".into(),
                reason: format!("invalid date '{s}' (expected YYYY-MM-DD)"),
            }
        }),
        None => {
            let today = Local::now().date_naive();
            Ok(today.checked_sub_days(Days::new(1)).unwrap_or(today))
        }
    }
}

pub fn resolve_data_dir(data_dir: Option<&PathBuf>, config: &dyn ConfigPort) -> PathBuf {
    data_dir
        .cloned()
        .or_else(|| config.get_string("data", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn resolve_output_dir(output: Option<&PathBuf>, config: &dyn ConfigPort) -> Option<PathBuf> {
    output
        .cloned()
        .or_else(|| config.get_string("report", "output_dir").map(PathBuf::from))
}

fn run_analyze(
    config_path: &PathBuf,
    date: Option<&str>,
    data_dir: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load and validate config
    info!(path = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let analysis = match build_analysis_config(&adapter) {
        Ok(a) => a,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    // Stage 2: Resolve the window end date
    let end_date = match resolve_end_date(date) {
        Ok(d) => d,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    // Stage 3: Wire adapters and run
    let data_port = CsvPriceAdapter::new(resolve_data_dir(data_dir, &adapter));
    let reporters = build_reporters(output, &adapter);
    let reporters: Vec<&dyn ReportPort> = reporters.iter().map(|r| r.as_ref()).collect();

    run_analysis_pipeline(&analysis, &data_port, end_date, &reporters)
}

/// CSV reports always, HTML unless `[report] html = false`. None without an output dir.
pub fn build_reporters(
    output: Option<&PathBuf>,
    config: &dyn ConfigPort,
) -> Vec<Box<dyn ReportPort>> {
    let Some(dir) = resolve_output_dir(output, config) else {
        return Vec::new();
    };
    let mut reporters: Vec<Box<dyn ReportPort>> = Vec::new();
    reporters.push(Box::new(CsvReportAdapter::new(dir.clone())));
    if config.get_bool("report", "html", true) {
        reporters.push(Box::new(HtmlReportAdapter::new(dir)));
    }
    reporters
}

/// Evaluates, prints a summary table per asset to stdout, and hands the
/// successful results to every reporter. Returns success only when every asset
/// evaluated and every report was written; otherwise the first failure's code.
pub fn run_analysis_pipeline(
    analysis: &AnalysisConfig,
    data_port: &(dyn PriceDataPort + Sync),
    end_date: NaiveDate,
    reporters: &[&dyn ReportPort],
) -> ExitCode {
    let outcomes = match evaluate_portfolio(analysis, data_port, end_date) {
        Ok(o) => o,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    let mut first_failure: Option<ExitCode> = None;
    let mut evaluated = Vec::with_capacity(outcomes.len());

    for AssetOutcome { asset, result } in &outcomes {
        match result {
            Ok(result) => {
                println!("{}", format_summary_table(result));
                evaluated.push(result);
            }
            Err(e) => {
                error!(asset = %asset, "{e}");
                first_failure.get_or_insert(e.into());
            }
        }
    }

    for reporter in reporters {
        if let Err(e) = reporter.write_all(&evaluated) {
            error!("failed to write report: {e}");
            first_failure.get_or_insert((&e).into());
        }
    }

    info!(
        assets = outcomes.len(),
        failed = outcomes.len() - evaluated.len(),
        "analysis complete"
    );
    first_failure.unwrap_or(ExitCode::SUCCESS)
}

/// Plain-text summary table for one asset.
pub fn format_summary_table(result: &PortfolioResult) -> String {
    let rows: Vec<[String; 5]> = result.summaries.iter().map(|r| r.to_row()).collect();

    let mut widths = SUMMARY_HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                if i == 0 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let first = result.pnl.dates.first().map(|d| d.to_string()).unwrap_or_default();
    let last = result.pnl.dates.last().map(|d| d.to_string()).unwrap_or_default();

    let mut out = format!("=== {} ({} to {}) ===\n", result.asset, first, last);
    out.push_str(&render(&SUMMARY_HEADERS.map(String::from)));
    for row in &rows {
        out.push('\n');
        out.push_str(&render(row));
    }
    out
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    info!(path = %config_path.display(), "validating config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let analysis = match build_analysis_config(&adapter) {
        Ok(a) => a,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    println!("window:  {} years", analysis.window_years());
    println!("assets:  {}", analysis.assets().join(", "));
    println!("strategies:");
    for instance in analysis.instances() {
        if instance.params.is_empty() {
            println!("  {}", instance.name());
        } else {
            let params: Vec<String> = instance
                .params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            println!("  {} ({})", instance.name(), params.join(", "));
        }
    }
    println!("data dir: {}", resolve_data_dir(None, &adapter).display());
    ExitCode::SUCCESS
}

fn run_strategies() -> ExitCode {
    for kind in StrategyKind::ALL {
        let params = kind.param_names();
        if params.is_empty() {
            println!("{:<16} {}", kind.id(), kind.description());
        } else {
            println!(
                "{:<16} {} [params: {}]",
                kind.id(),
                kind.description(),
                params.join(", ")
            );
        }
    }
    ExitCode::SUCCESS
}

fn run_assets(config_path: Option<&PathBuf>, data_dir: Option<&PathBuf>) -> ExitCode {
    let dir = match config_path {
        Some(path) => match load_config(path) {
            Ok(adapter) => resolve_data_dir(data_dir, &adapter),
            Err(code) => return code,
        },
        None => data_dir
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
    };

    match CsvPriceAdapter::new(dir).list_assets() {
        Ok(assets) => {
            for asset in assets {
                println!("{asset}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}
