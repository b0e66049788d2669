//! Price data access port trait.

use crate::domain::error::LongbiasError;
use crate::domain::price_series::PriceSeries;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Closing prices for `asset` within `[start_date, end_date]`.
    /// Fails with `DataUnavailable` when nothing can be served; never returns
    /// an empty series.
    fn fetch_prices(
        &self,
        asset: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, LongbiasError>;

    fn list_assets(&self) -> Result<Vec<String>, LongbiasError>;
}
