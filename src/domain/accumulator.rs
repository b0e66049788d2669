//! Position accumulation: cash flows + prices -> position, value, PnL and drawdown.
//!
//! A single left-to-right scan; each row depends only on earlier rows.

use chrono::NaiveDate;

use crate::domain::cash_flow::CashFlowSchedule;
use crate::domain::error::LongbiasError;
use crate::domain::price_series::PriceSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub cash_flow: f64,
    /// Capital deployed up to and including this date.
    pub cash_flow_acc: f64,
    pub units_bought: f64,
    /// Cumulative units held. Never decreases.
    pub position: f64,
    pub position_value: f64,
    /// Period return of the position value; `None` on the first date or after a zero value.
    pub pnl_pct: Option<f64>,
    /// `(position_value - cash_flow_acc) * 100`.
    pub pnl: f64,
    /// Fractional decline from the running peak of position value, in [-1, 0].
    pub drawdown: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedSeries {
    pub name: String,
    pub points: Vec<AccumulatedPoint>,
}

impl AccumulatedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&AccumulatedPoint> {
        self.points.last()
    }

    /// Named PnL curve as (date, pnl) pairs.
    pub fn pnl_curve(&self) -> Vec<(NaiveDate, f64)> {
        self.points.iter().map(|p| (p.date, p.pnl)).collect()
    }

    /// Defined period returns only.
    pub fn returns(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.pnl_pct).collect()
    }
}

pub fn accumulate(
    name: &str,
    series: &PriceSeries,
    schedule: &CashFlowSchedule,
) -> Result<AccumulatedSeries, LongbiasError> {
    if schedule.len() != series.len() {
        return Err(LongbiasError::ScheduleMismatch {
            schedule: schedule.len(),
            prices: series.len(),
        });
    }
    if let Some((scheduled, bar)) = schedule
        .dates
        .iter()
        .zip(series.points())
        .find(|(scheduled, bar)| **scheduled != bar.date)
    {
        return Err(LongbiasError::ScheduleDateMismatch {
            scheduled: *scheduled,
            priced: bar.date,
        });
    }

    let mut points = Vec::with_capacity(series.len());
    let mut cash_flow_acc = 0.0_f64;
    let mut position = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut prev_value: Option<f64> = None;

    for (bar, &cash_flow) in series.points().iter().zip(&schedule.amounts) {
        if bar.price == 0.0 {
            return Err(LongbiasError::ZeroPrice { date: bar.date });
        }

        cash_flow_acc += cash_flow;
        let units_bought = cash_flow / bar.price;
        position += units_bought;
        let position_value = position * bar.price;

        let pnl_pct = match prev_value {
            Some(prev) if prev != 0.0 => Some(position_value / prev - 1.0),
            _ => None,
        };

        peak = peak.max(position_value);
        let drawdown = if peak > 0.0 {
            (position_value - peak) / peak
        } else {
            0.0
        };

        points.push(AccumulatedPoint {
            date: bar.date,
            price: bar.price,
            cash_flow,
            cash_flow_acc,
            units_bought,
            position,
            position_value,
            pnl_pct,
            pnl: (position_value - cash_flow_acc) * 100.0,
            drawdown,
        });
        prev_value = Some(position_value);
    }

    Ok(AccumulatedSeries {
        name: name.to_string(),
        points,
    })
}
