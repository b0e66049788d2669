//! Report generation port trait.

use crate::domain::error::LongbiasError;
use crate::domain::portfolio::PortfolioResult;

/// Port for writing per-asset evaluation results.
pub trait ReportPort {
    fn write(&self, result: &PortfolioResult) -> Result<(), LongbiasError>;

    /// Default implementation: writes each result in turn, stopping at the first failure.
    fn write_all(&self, results: &[&PortfolioResult]) -> Result<(), LongbiasError> {
        for result in results {
            self.write(result)?;
        }
        Ok(())
    }
}
