//! Per-date capital deployment plan for one strategy instance.

use chrono::NaiveDate;

/// Total capital every strategy deploys over its window.
pub const TOTAL_BUDGET: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CashFlowSchedule {
    pub dates: Vec<NaiveDate>,
    pub amounts: Vec<f64>,
}

impl CashFlowSchedule {
    pub fn new(dates: Vec<NaiveDate>, amounts: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), amounts.len());
        Self { dates, amounts }
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.amounts.iter().sum()
    }

    /// Number of dates with a non-zero investment.
    pub fn investment_count(&self) -> usize {
        self.amounts.iter().filter(|&&a| a > 0.0).count()
    }
}
