//! Analysis configuration: lookback window, assets and strategy profiles.
//!
//! Built and validated once, then passed explicitly to the evaluator.

use chrono::{Months, NaiveDate};
use std::collections::BTreeMap;

use crate::domain::error::LongbiasError;
use crate::domain::strategy::{StrategyConfig, StrategyKind, StrategyParams};

/// One strategy kind plus its named parameter sets, in name order.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyProfile {
    pub kind: StrategyKind,
    pub sub_strategies: BTreeMap<String, StrategyParams>,
}

impl StrategyProfile {
    pub fn plain(kind: StrategyKind) -> Self {
        Self {
            kind,
            sub_strategies: BTreeMap::new(),
        }
    }

    pub fn with_sub(mut self, name: &str, params: StrategyParams) -> Self {
        self.sub_strategies.insert(name.to_string(), params);
        self
    }

    /// One config per sub-strategy, or a single unnamed config when there are none.
    pub fn instances(&self) -> Vec<StrategyConfig> {
        if self.sub_strategies.is_empty() {
            return vec![StrategyConfig::plain(self.kind)];
        }
        self.sub_strategies
            .iter()
            .map(|(name, params)| StrategyConfig::with_params(self.kind, name, params.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    window_years: u32,
    assets: Vec<String>,
    profiles: Vec<StrategyProfile>,
    parallel: bool,
}

impl AnalysisConfig {
    /// Fails on an empty window, no assets, no profiles, or any strategy
    /// instance whose parameters do not validate.
    pub fn new(
        window_years: u32,
        assets: Vec<String>,
        profiles: Vec<StrategyProfile>,
    ) -> Result<Self, LongbiasError> {
        if window_years == 0 {
            return Err(LongbiasError::ConfigInvalid {
                section: "analysis".into(),
                key: "window".into(),
                reason: "window must be at least 1 year".into(),
            });
        }
        if assets.is_empty() {
            return Err(LongbiasError::ConfigMissing {
                section: "analysis".into(),
                key: "cryptos".into(),
            });
        }
        if profiles.is_empty() {
            return Err(LongbiasError::ConfigMissing {
                section: "analysis".into(),
                key: "strat_profiles".into(),
            });
        }
        for profile in &profiles {
            for instance in profile.instances() {
                instance.build()?;
            }
        }

        Ok(Self {
            window_years,
            assets,
            profiles,
            parallel: true,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn window_years(&self) -> u32 {
        self.window_years
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn profiles(&self) -> &[StrategyProfile] {
        &self.profiles
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Every strategy instance in evaluation order.
    pub fn instances(&self) -> Vec<StrategyConfig> {
        self.profiles.iter().flat_map(|p| p.instances()).collect()
    }

    /// `[end - window years, end]`.
    pub fn window(&self, end_date: NaiveDate) -> Result<(NaiveDate, NaiveDate), LongbiasError> {
        let start = self
            .window_years
            .checked_mul(12)
            .and_then(|months| end_date.checked_sub_months(Months::new(months)))
            .ok_or_else(|| LongbiasError::ConfigInvalid {
                section: "analysis".into(),
                key: "window".into(),
                reason: format!("{} years before {} is out of range", self.window_years, end_date),
            })?;
        Ok((start, end_date))
    }
}
