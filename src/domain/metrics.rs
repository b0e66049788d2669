//! Summary metrics for one accumulated strategy series.

use super::accumulator::AccumulatedSeries;
use super::stats::{mean, round2, std_dev};

/// Column headers used when tabulating summaries.
pub const SUMMARY_HEADERS: [&str; 5] = ["strategy", "pnl (%)", "vol (%)", "sharpe", "MDD (%)"];

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub strategy: String,
    /// Final PnL curve value, percentage points.
    pub final_pnl: f64,
    /// Sample standard deviation of period returns, percent.
    pub volatility: f64,
    /// Mean period return over its sample standard deviation, floored at 0.
    pub sharpe: f64,
    /// Worst drawdown, percent (<= 0).
    pub max_drawdown: f64,
}

impl SummaryRecord {
    /// All figures rounded to two decimals. Fewer than two defined returns or a
    /// zero spread give zero volatility and zero Sharpe.
    pub fn compute(series: &AccumulatedSeries) -> Self {
        let final_pnl = series.last().map(|p| p.pnl).unwrap_or(0.0);

        let returns = series.returns();
        let vol = std_dev(&returns, 1).unwrap_or(0.0);
        let sharpe = match mean(&returns) {
            Some(m) if vol > 0.0 => (m / vol).max(0.0),
            _ => 0.0,
        };

        let max_drawdown = series
            .points
            .iter()
            .map(|p| p.drawdown)
            .fold(0.0_f64, f64::min);

        SummaryRecord {
            strategy: series.name.clone(),
            final_pnl: round2(final_pnl),
            volatility: round2(vol * 100.0),
            sharpe: round2(sharpe),
            max_drawdown: round2(max_drawdown * 100.0),
        }
    }

    pub fn to_row(&self) -> [String; 5] {
        [
            self.strategy.clone(),
            format!("{:.2}", self.final_pnl),
            format!("{:.2}", self.volatility),
            format!("{:.2}", self.sharpe),
            format!("{:.2}", self.max_drawdown),
        ]
    }
}
