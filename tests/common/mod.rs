#![allow(dead_code)]

use chrono::NaiveDate;
use longbias::domain::analysis::{AnalysisConfig, StrategyProfile};
use longbias::domain::error::LongbiasError;
pub use longbias::domain::price_series::{PricePoint, PriceSeries};
use longbias::domain::strategy::{
    StrategyKind, StrategyParams, PARAM_INITIAL_INVEST, PARAM_THRESHOLD,
};
use longbias::ports::data_port::PriceDataPort;
use std::collections::HashMap;

pub struct MockPriceDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, asset: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(asset.to_string(), points);
        self
    }

    pub fn with_error(mut self, asset: &str, reason: &str) -> Self {
        self.errors.insert(asset.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockPriceDataPort {
    fn fetch_prices(
        &self,
        asset: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, LongbiasError> {
        let unavailable = |reason: String| LongbiasError::DataUnavailable {
            asset: asset.to_string(),
            reason,
        };
        if let Some(reason) = self.errors.get(asset) {
            return Err(unavailable(reason.clone()));
        }
        let points: Vec<PricePoint> = self
            .data
            .get(asset)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        if points.is_empty() {
            return Err(unavailable("no rows in window".to_string()));
        }
        PriceSeries::new(asset, points)
    }

    fn list_assets(&self) -> Result<Vec<String>, LongbiasError> {
        let mut assets: Vec<String> = self.data.keys().cloned().collect();
        assets.sort();
        Ok(assets)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily points starting at `start`.
pub fn daily_points(start: NaiveDate, prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint {
            date: start + chrono::Duration::days(i as i64),
            price,
        })
        .collect()
}

pub fn make_series(asset: &str, prices: &[f64]) -> PriceSeries {
    PriceSeries::new(asset, daily_points(date(2024, 1, 1), prices)).unwrap()
}

pub fn drop_params(threshold: f64, initial_invest: f64) -> StrategyParams {
    StrategyParams::from([
        (PARAM_THRESHOLD.to_string(), threshold),
        (PARAM_INITIAL_INVEST.to_string(), initial_invest),
    ])
}

/// All four kinds, one sub-strategy each for the parameterised ones.
pub fn sample_config(assets: &[&str]) -> AnalysisConfig {
    AnalysisConfig::new(
        1,
        assets.iter().map(|a| a.to_string()).collect(),
        vec![
            StrategyProfile::plain(StrategyKind::Hold),
            StrategyProfile::plain(StrategyKind::Periodic),
            StrategyProfile::plain(StrategyKind::ThresholdDrop)
                .with_sub("dip", drop_params(0.1, 0.5)),
            StrategyProfile::plain(StrategyKind::ZScoreDrop)
                .with_sub("sigma", drop_params(1.0, 0.2)),
        ],
    )
    .unwrap()
}

/// A small price path with a couple of sharp drops.
pub const SAMPLE_PRICES: [f64; 10] = [100.0, 102.0, 85.0, 90.0, 95.0, 80.0, 82.0, 88.0, 93.0, 99.0];
