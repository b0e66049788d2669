//! Per-asset evaluation of every configured strategy instance.
//!
//! Each instance runs Strategy -> accumulate -> SummaryRecord. PnL curves are
//! outer-joined on date into a [`PnlTable`]; summaries are sorted by name.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::domain::accumulator::{accumulate, AccumulatedSeries};
use crate::domain::analysis::AnalysisConfig;
use crate::domain::error::LongbiasError;
use crate::domain::metrics::SummaryRecord;
use crate::domain::price_series::PriceSeries;
use crate::domain::strategy::StrategyConfig;
use crate::ports::data_port::PriceDataPort;

/// Wide table of PnL curves: one row per date, one column per strategy instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PnlTable {
    pub columns: Vec<String>,
    pub dates: Vec<NaiveDate>,
    /// `rows[i][j]` is column `j` on `dates[i]`; `None` where that curve has no entry.
    pub rows: Vec<Vec<Option<f64>>>,
}

impl PnlTable {
    /// Outer join on date: the union of all dates, undefined where a curve is absent.
    pub fn outer_join(curves: &[(String, Vec<(NaiveDate, f64)>)]) -> Self {
        let width = curves.len();
        let mut merged: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();

        for (col, (_, curve)) in curves.iter().enumerate() {
            for &(date, value) in curve {
                merged.entry(date).or_insert_with(|| vec![None; width])[col] = Some(value);
            }
        }

        let (dates, rows): (Vec<NaiveDate>, Vec<Vec<Option<f64>>>) = merged.into_iter().unzip();
        PnlTable {
            columns: curves.iter().map(|(name, _)| name.clone()).collect(),
            dates,
            rows,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    pub fn get(&self, date: NaiveDate, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        let row = self.dates.binary_search(&date).ok()?;
        self.rows[row][col]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioResult {
    pub asset: String,
    pub pnl: PnlTable,
    /// Sorted ascending by strategy name.
    pub summaries: Vec<SummaryRecord>,
}

/// Outcome of one asset in a batch run.
#[derive(Debug)]
pub struct AssetOutcome {
    pub asset: String,
    pub result: Result<PortfolioResult, LongbiasError>,
}

pub fn evaluate_instance(
    series: &PriceSeries,
    config: &StrategyConfig,
) -> Result<(AccumulatedSeries, SummaryRecord), LongbiasError> {
    let name = config.name();
    let strategy = config.build()?;
    let schedule = strategy.cash_flows(series);
    let accumulated = accumulate(&name, series, &schedule)?;
    let summary = SummaryRecord::compute(&accumulated);

    debug!(
        asset = series.asset(),
        strategy = %name,
        investments = schedule.investment_count(),
        final_pnl = summary.final_pnl,
        "strategy evaluated"
    );

    Ok((accumulated, summary))
}

/// Runs every instance against one asset. The first failing instance aborts
/// the asset; the error names the asset and the instance.
pub fn evaluate_asset(
    series: &PriceSeries,
    instances: &[StrategyConfig],
) -> Result<PortfolioResult, LongbiasError> {
    let mut curves = Vec::with_capacity(instances.len());
    let mut summaries = Vec::with_capacity(instances.len());

    for config in instances {
        let (accumulated, summary) =
            evaluate_instance(series, config).map_err(|e| LongbiasError::StrategyFailed {
                asset: series.asset().to_string(),
                strategy: config.name(),
                source: Box::new(e),
            })?;
        curves.push((accumulated.name.clone(), accumulated.pnl_curve()));
        summaries.push(summary);
    }

    summaries.sort_by(|a, b| a.strategy.cmp(&b.strategy));

    info!(
        asset = series.asset(),
        dates = series.len(),
        instances = instances.len(),
        "asset evaluated"
    );

    Ok(PortfolioResult {
        asset: series.asset().to_string(),
        pnl: PnlTable::outer_join(&curves),
        summaries,
    })
}

fn fetch_and_evaluate(
    port: &(dyn PriceDataPort + Sync),
    asset: &str,
    window: (NaiveDate, NaiveDate),
    instances: &[StrategyConfig],
) -> Result<PortfolioResult, LongbiasError> {
    let series = port.fetch_prices(asset, window.0, window.1)?;
    evaluate_asset(&series, instances)
}

/// Evaluates every configured asset over the window ending at `end_date`.
/// Outcomes are returned in configuration order; a failing asset does not
/// affect its siblings.
pub fn evaluate_portfolio(
    config: &AnalysisConfig,
    port: &(dyn PriceDataPort + Sync),
    end_date: NaiveDate,
) -> Result<Vec<AssetOutcome>, LongbiasError> {
    let window = config.window(end_date)?;
    let instances = config.instances();
    info!(
        start = %window.0,
        end = %window.1,
        assets = config.assets().len(),
        instances = instances.len(),
        "evaluating portfolio"
    );

    let results: Vec<Result<PortfolioResult, LongbiasError>> =
        if config.parallel() && config.assets().len() > 1 {
            std::thread::scope(|scope| {
                let handles: Vec<_> = config
                    .assets()
                    .iter()
                    .map(|asset| {
                        let instances = &instances;
                        scope.spawn(move || fetch_and_evaluate(port, asset, window, instances))
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
                    .collect()
            })
        } else {
            config
                .assets()
                .iter()
                .map(|asset| fetch_and_evaluate(port, asset, window, &instances))
                .collect()
        };

    Ok(config
        .assets()
        .iter()
        .zip(results)
        .map(|(asset, result)| {
            if let Err(e) = &result {
                warn!(asset = %asset, error = %e, "asset skipped");
            }
            AssetOutcome {
                asset: asset.clone(),
                result,
            }
        })
        .collect())
}
