//! Cash deployment strategies.
//!
//! Strategy kinds form a closed set. A [`StrategyConfig`] names a kind plus an
//! optional parameter block; [`StrategyConfig::build`] validates it into a
//! [`Strategy`], which turns a [`PriceSeries`] into a [`CashFlowSchedule`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::cash_flow::{CashFlowSchedule, TOTAL_BUDGET};
use crate::domain::error::LongbiasError;
use crate::domain::price_series::PriceSeries;
use crate::domain::stats::{pct_change, zscore};

pub const PARAM_THRESHOLD: &str = "threshold";
pub const PARAM_INITIAL_INVEST: &str = "initial_invest";

/// Installment spacing for the periodic strategy, in rows.
const PERIOD_ROWS: usize = 7;

pub type StrategyParams = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    Hold,
    Periodic,
    ThresholdDrop,
    ZScoreDrop,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Hold,
        StrategyKind::Periodic,
        StrategyKind::ThresholdDrop,
        StrategyKind::ZScoreDrop,
    ];

    /// Identifier used in configuration and in result names.
    pub fn id(&self) -> &'static str {
        match self {
            StrategyKind::Hold => "buy_and_hold",
            StrategyKind::Periodic => "buy_every_week",
            StrategyKind::ThresholdDrop => "cash_allocation",
            StrategyKind::ZScoreDrop => "z_score",
        }
    }

    fn alias(&self) -> &'static str {
        match self {
            StrategyKind::Hold => "hold",
            StrategyKind::Periodic => "periodic",
            StrategyKind::ThresholdDrop => "threshold_drop",
            StrategyKind::ZScoreDrop => "zscore_drop",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::Hold => "invest everything on the first date",
            StrategyKind::Periodic => "equal installments every 7th date",
            StrategyKind::ThresholdDrop => {
                "initial stake, rest split across daily drops <= -threshold"
            }
            StrategyKind::ZScoreDrop => {
                "initial stake, rest split across return z-scores <= -threshold"
            }
        }
    }

    pub fn requires_params(&self) -> bool {
        matches!(self, StrategyKind::ThresholdDrop | StrategyKind::ZScoreDrop)
    }

    /// Parameter names this kind understands.
    pub fn param_names(&self) -> &'static [&'static str] {
        if self.requires_params() {
            &[PARAM_THRESHOLD, PARAM_INITIAL_INVEST]
        } else {
            &[]
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = LongbiasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.id() == name || k.alias() == name)
            .ok_or(LongbiasError::UnknownStrategy {
                name: s.trim().to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropParams {
    /// Positive fraction; a drop of at least this much triggers a purchase.
    pub threshold: f64,
    /// Fraction of the budget deployed on the first date.
    pub initial_invest: f64,
}

impl DropParams {
    pub fn new(
        kind: StrategyKind,
        threshold: f64,
        initial_invest: f64,
    ) -> Result<Self, LongbiasError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(LongbiasError::InvalidParameter {
                strategy: kind.id().to_string(),
                param: PARAM_THRESHOLD.to_string(),
                reason: format!("must be positive, got {threshold}"),
            });
        }
        if !(0.0..=1.0).contains(&initial_invest) {
            return Err(LongbiasError::InvalidParameter {
                strategy: kind.id().to_string(),
                param: PARAM_INITIAL_INVEST.to_string(),
                reason: format!("must be between 0 and 1, got {initial_invest}"),
            });
        }
        Ok(Self {
            threshold,
            initial_invest,
        })
    }

    pub fn from_params(kind: StrategyKind, params: &StrategyParams) -> Result<Self, LongbiasError> {
        let get = |name: &str| {
            params
                .get(name)
                .copied()
                .ok_or_else(|| LongbiasError::MissingParameter {
                    strategy: kind.id().to_string(),
                    param: name.to_string(),
                })
        };
        Self::new(kind, get(PARAM_THRESHOLD)?, get(PARAM_INITIAL_INVEST)?)
    }
}

/// One (kind, parameter set) pair, optionally named as a sub-strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    pub sub_name: Option<String>,
    pub params: StrategyParams,
}

impl StrategyConfig {
    pub fn plain(kind: StrategyKind) -> Self {
        Self {
            kind,
            sub_name: None,
            params: StrategyParams::new(),
        }
    }

    pub fn with_params(kind: StrategyKind, sub_name: &str, params: StrategyParams) -> Self {
        Self {
            kind,
            sub_name: Some(sub_name.to_string()),
            params,
        }
    }

    /// `{kind}` or `{kind}_{sub_name}`.
    pub fn name(&self) -> String {
        match &self.sub_name {
            Some(sub) => format!("{}_{}", self.kind.id(), sub),
            None => self.kind.id().to_string(),
        }
    }

    pub fn build(&self) -> Result<Strategy, LongbiasError> {
        Strategy::from_params(self.kind, &self.params)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    Hold,
    Periodic,
    ThresholdDrop(DropParams),
    ZScoreDrop(DropParams),
}

impl Strategy {
    pub fn from_params(kind: StrategyKind, params: &StrategyParams) -> Result<Self, LongbiasError> {
        Ok(match kind {
            StrategyKind::Hold => Strategy::Hold,
            StrategyKind::Periodic => Strategy::Periodic,
            StrategyKind::ThresholdDrop => {
                Strategy::ThresholdDrop(DropParams::from_params(kind, params)?)
            }
            StrategyKind::ZScoreDrop => {
                Strategy::ZScoreDrop(DropParams::from_params(kind, params)?)
            }
        })
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Hold => StrategyKind::Hold,
            Strategy::Periodic => StrategyKind::Periodic,
            Strategy::ThresholdDrop(_) => StrategyKind::ThresholdDrop,
            Strategy::ZScoreDrop(_) => StrategyKind::ZScoreDrop,
        }
    }

    /// Build the cash-flow schedule over the series' date domain.
    /// The amounts always sum to [`TOTAL_BUDGET`].
    pub fn cash_flows(&self, series: &PriceSeries) -> CashFlowSchedule {
        let n = series.len();
        let amounts = match self {
            Strategy::Hold => hold_amounts(n),
            Strategy::Periodic => periodic_amounts(n),
            Strategy::ThresholdDrop(params) => {
                let triggers: Vec<bool> = pct_change(&series.prices())
                    .into_iter()
                    .map(|change| change.is_some_and(|c| c <= -params.threshold))
                    .collect();
                allocate_on_triggers(params, &triggers)
            }
            Strategy::ZScoreDrop(params) => {
                let filled: Vec<f64> = pct_change(&series.prices())
                    .into_iter()
                    .map(|change| change.unwrap_or(0.0))
                    .collect();
                let triggers: Vec<bool> = zscore(&filled)
                    .into_iter()
                    .map(|z| z <= -params.threshold)
                    .collect();
                allocate_on_triggers(params, &triggers)
            }
        };
        CashFlowSchedule::new(series.dates(), amounts)
    }
}

fn hold_amounts(n: usize) -> Vec<f64> {
    let mut amounts = vec![0.0; n];
    if n > 0 {
        amounts[0] = TOTAL_BUDGET;
    }
    amounts
}

// One installment at every row index divisible by PERIOD_ROWS.
fn periodic_amounts(n: usize) -> Vec<f64> {
    let installments = n.div_ceil(PERIOD_ROWS);
    if installments == 0 {
        return Vec::new();
    }
    let each = TOTAL_BUDGET / installments as f64;
    (0..n)
        .map(|i| if i % PERIOD_ROWS == 0 { each } else { 0.0 })
        .collect()
}

// Date 0 never triggers. Without any trigger the whole budget goes in on date 0.
fn allocate_on_triggers(params: &DropParams, triggers: &[bool]) -> Vec<f64> {
    let mut amounts = vec![0.0; triggers.len()];
    if amounts.is_empty() {
        return amounts;
    }

    let trigger_count = triggers.iter().skip(1).filter(|&&t| t).count();
    if trigger_count == 0 {
        amounts[0] = TOTAL_BUDGET;
        return amounts;
    }

    amounts[0] = TOTAL_BUDGET * params.initial_invest;
    let each = (TOTAL_BUDGET - amounts[0]) / trigger_count as f64;
    for (amount, _) in amounts
        .iter_mut()
        .zip(triggers)
        .skip(1)
        .filter(|(_, triggered)| **triggered)
    {
        *amount = each;
    }
    amounts
}
