//! # Factor Table
//!
//! Monthly returns of the fixed five-factor set plus the risk-free rate,
//! stored as fractions. Percent-quoted sources are divided by 100 exactly
//! once, at load time.

use chrono::NaiveDate;
use ndarray::Array2;

use crate::error::EngineError;
use crate::error::Result;

/// Regressor names, in the order coefficients are reported.
pub const FACTOR_NAMES: [&str; 5] = ["Mkt-RF", "SMB", "HML", "RMW", "CMA"];

/// Column name of the risk-free rate.
pub const RISK_FREE_NAME: &str = "RF";

/// Read-only monthly factor returns, date-ascending.
#[derive(Clone, Debug)]
pub struct FactorTable {
  dates: Vec<NaiveDate>,
  /// One row per date, one column per entry of [`FACTOR_NAMES`].
  factors: Array2<f64>,
  risk_free: Vec<f64>,
}

impl FactorTable {
  /// Build a factor table from parallel rows.
  pub fn new(dates: Vec<NaiveDate>, factors: Array2<f64>, risk_free: Vec<f64>) -> Result<Self> {
    if factors.ncols() != FACTOR_NAMES.len() {
      return Err(EngineError::schema(
        "factors",
        format!(
          "expected {} factor columns, got {}",
          FACTOR_NAMES.len(),
          factors.ncols()
        ),
      ));
    }
    if dates.len() != factors.nrows() || dates.len() != risk_free.len() {
      return Err(EngineError::schema(
        "factors",
        format!(
          "ragged table: {} dates, {} factor rows, {} risk-free rows",
          dates.len(),
          factors.nrows(),
          risk_free.len()
        ),
      ));
    }

    Ok(Self {
      dates,
      factors,
      risk_free,
    })
  }

  /// Number of dated rows.
  pub fn len(&self) -> usize {
    self.dates.len()
  }

  /// Check if empty.
  pub fn is_empty(&self) -> bool {
    self.dates.is_empty()
  }

  /// Dates of the table.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Factor rows, fraction units.
  pub fn factors(&self) -> &Array2<f64> {
    &self.factors
  }

  /// Risk-free column, fraction units.
  pub fn risk_free(&self) -> &[f64] {
    &self.risk_free
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_wrong_column_count() {
    let err = FactorTable::new(
      vec![NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()],
      Array2::zeros((1, 3)),
      vec![0.0],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Schema { .. }));
  }

  #[test]
  fn rejects_ragged_rows() {
    let err = FactorTable::new(
      vec![NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()],
      Array2::zeros((2, 5)),
      vec![0.0, 0.0],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Schema { .. }));
  }
}
