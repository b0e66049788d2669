//! Date-indexed closing prices for a single asset.

use crate::domain::error::LongbiasError;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// A validated price series: non-empty, strictly increasing dates, prices > 0.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    asset: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(asset: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, LongbiasError> {
        let asset = asset.into();
        if points.is_empty() {
            return Err(LongbiasError::DataUnavailable {
                asset,
                reason: "empty price series".into(),
            });
        }

        for (i, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(LongbiasError::InvalidPrice {
                    asset,
                    date: point.date,
                    price: point.price,
                });
            }
            if i > 0 && point.date <= points[i - 1].date {
                return Err(LongbiasError::UnorderedDates {
                    asset,
                    date: point.date,
                });
            }
        }

        Ok(Self { asset, points })
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed series; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.points[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }
}
