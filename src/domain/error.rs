//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for longbias.
#[derive(Debug, thiserror::Error)]
pub enum LongbiasError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("strategy {strategy} requires parameter {param}")]
    MissingParameter { strategy: String, param: String },

    #[error("invalid parameter {param} for {strategy}: {reason}")]
    InvalidParameter {
        strategy: String,
        param: String,
        reason: String,
    },

    #[error("no price data for {asset}: {reason}")]
    DataUnavailable { asset: String, reason: String },

    #[error("invalid price {price} for {asset} on {date}")]
    InvalidPrice {
        asset: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("dates for {asset} are not strictly increasing at {date}")]
    UnorderedDates { asset: String, date: NaiveDate },

    #[error("zero price on {date}, cannot size purchase")]
    ZeroPrice { date: NaiveDate },

    #[error("cash flow schedule has {schedule} entries, price series has {prices}")]
    ScheduleMismatch { schedule: usize, prices: usize },

    #[error("cash flow scheduled on {scheduled}, price series has {priced}")]
    ScheduleDateMismatch {
        scheduled: NaiveDate,
        priced: NaiveDate,
    },

    #[error("{asset}/{strategy}: {source}")]
    StrategyFailed {
        asset: String,
        strategy: String,
        #[source]
        source: Box<LongbiasError>,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LongbiasError {
    /// True for the configuration family (bad or missing strategy setup).
    pub fn is_config_error(&self) -> bool {
        match self {
            LongbiasError::ConfigParse { .. }
            | LongbiasError::ConfigMissing { .. }
            | LongbiasError::ConfigInvalid { .. }
            | LongbiasError::UnknownStrategy { .. }
            | LongbiasError::MissingParameter { .. }
            | LongbiasError::InvalidParameter { .. } => true,
            LongbiasError::StrategyFailed { source, .. } => source.is_config_error(),
            _ => false,
        }
    }

    /// True when price data could not be obtained or was unusable.
    pub fn is_data_error(&self) -> bool {
        match self {
            LongbiasError::DataUnavailable { .. }
            | LongbiasError::InvalidPrice { .. }
            | LongbiasError::UnorderedDates { .. } => true,
            LongbiasError::StrategyFailed { source, .. } => source.is_data_error(),
            _ => false,
        }
    }
}

impl From<&LongbiasError> for std::process::ExitCode {
    fn from(err: &LongbiasError) -> Self {
        let code: u8 = match err {
            LongbiasError::Io(_) | LongbiasError::Csv(_) => 1,
            e if e.is_config_error() => 2,
            e if e.is_data_error() => 3,
            _ => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_failed_carries_context() {
        let err = LongbiasError::StrategyFailed {
            asset: "BTC-USD".into(),
            strategy: "cash_allocation_dip".into(),
            source: Box::new(LongbiasError::MissingParameter {
                strategy: "cash_allocation".into(),
                param: "threshold".into(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("BTC-USD/cash_allocation_dip:"));
        assert!(msg.contains("threshold"));
        assert!(err.is_config_error());
        assert!(!err.is_data_error());
    }

    #[test]
    fn data_family() {
        let err = LongbiasError::DataUnavailable {
            asset: "ETH-USD".into(),
            reason: "file not found".into(),
        };
        assert!(err.is_data_error());
        assert!(!err.is_config_error());
    }

    #[test]
    fn numeric_errors_are_neither_family() {
        let err = LongbiasError::ZeroPrice {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert!(!err.is_data_error());
        assert!(!err.is_config_error());
    }
}
