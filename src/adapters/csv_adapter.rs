//! CSV file price data adapter.
//!
//! One file per asset, `<base_path>/<asset>.csv`, with a header row naming a
//! `date` column (YYYY-MM-DD) and a `close` column. Other columns are ignored.

use crate::domain::error::LongbiasError;
use crate::domain::price_series::{PricePoint, PriceSeries};
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const DATE_COLUMN: &str = "date";
const PRICE_COLUMNS: [&str; 2] = ["close", "price"];

fn column_index(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
}

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, asset: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", asset))
    }
}

impl PriceDataPort for CsvPriceAdapter {
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

        let path = self.csv_path(asset);
        let content = fs::read_to_string(&path)
            .map_err(|e| unavailable(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| unavailable(format!("CSV header error: {}", e)))?
            .clone();
        let date_idx = column_index(&headers, &[DATE_COLUMN])
            .ok_or_else(|| unavailable("missing date column".into()))?;
        let price_idx = column_index(&headers, &PRICE_COLUMNS)
            .ok_or_else(|| unavailable("missing close column".into()))?;

        let mut points = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| unavailable(format!("CSV parse error: {}", e)))?;

            let date_str = record.get(date_idx).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| {
                    unavailable(format!("row {}: invalid date '{}': {}", line + 1, date_str, e))
                })?;

            if date < start_date || date > end_date {
                continue;
            }

            let price_str = record.get(price_idx).unwrap_or_default().trim();
            let price: f64 = price_str
                .parse()
                .map_err(|e| {
                    unavailable(format!("row {}: invalid close '{}': {}", line + 1, price_str, e))
                })?;

            points.push(PricePoint { date, price });
        }

        if points.is_empty() {
            return Err(unavailable(format!(
                "no rows between {} and {}",
                start_date, end_date
            )));
        }

        points.sort_by_key(|p| p.date);
        debug!(asset, rows = points.len(), path = %path.display(), "prices loaded");
        PriceSeries::new(asset, points)
    }

    fn list_assets(&self) -> Result<Vec<String>, LongbiasError> {
        let entries = fs::read_dir(&self.base_path)?;

        let mut assets = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            let name_str = name.to_string_lossy();
            if let Some(asset) = name_str.strip_suffix(".csv") {
                assets.push(asset.to_string());
            }
        }

        assets.sort();
        Ok(assets)
    }
}
