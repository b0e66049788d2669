//! CSV report adapter implementing ReportPort.
//!
//! Writes `<asset>_pnl.csv` (wide PnL table) and `<asset>_summary.csv` per asset.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::error::LongbiasError;
use crate::domain::metrics::SUMMARY_HEADERS;
use crate::domain::portfolio::PortfolioResult;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter {
    output_dir: PathBuf,
}

impl CsvReportAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn pnl_path(&self, asset: &str) -> PathBuf {
        self.output_dir.join(format!("{}_pnl.csv", asset))
    }

    pub fn summary_path(&self, asset: &str) -> PathBuf {
        self.output_dir.join(format!("{}_summary.csv", asset))
    }

    fn write_pnl(&self, path: &Path, result: &PortfolioResult) -> Result<(), LongbiasError> {
        let mut wtr = csv::Writer::from_path(path)?;

        let mut header = vec!["date".to_string()];
        header.extend(result.pnl.columns.iter().cloned());
        wtr.write_record(&header)?;

        for (date, row) in result.pnl.dates.iter().zip(&result.pnl.rows) {
            let mut record = vec![date.format("%Y-%m-%d").to_string()];
            record.extend(row.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_summary(&self, path: &Path, result: &PortfolioResult) -> Result<(), LongbiasError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(SUMMARY_HEADERS)?;
        for record in &result.summaries {
            wtr.write_record(record.to_row())?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &PortfolioResult) -> Result<(), LongbiasError> {
        fs::create_dir_all(&self.output_dir)?;

        let pnl_path = self.pnl_path(&result.asset);
        self.write_pnl(&pnl_path, result)?;

        let summary_path = self.summary_path(&result.asset);
        self.write_summary(&summary_path, result)?;

        info!(
            asset = %result.asset,
            pnl = %pnl_path.display(),
            summary = %summary_path.display(),
            "report written"
        );
        Ok(())
    }
}
