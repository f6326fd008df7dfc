//! # Factor Regression
//!
//! $$
//! r_t - rf_t = \alpha + \beta^\top F_t + \varepsilon_t
//! $$
//!
//! Ordinary least squares of a series' excess returns on the fixed factor
//! set. The risk-free column only builds the dependent variable; it is not
//! a regressor, and the intercept is fitted but never reported.

use std::collections::HashMap;

use chrono::NaiveDate;
use nalgebra::DMatrix;
use nalgebra::DVector;

use super::table::FactorTable;
use super::table::FACTOR_NAMES;
use crate::error::EngineError;
use crate::error::Result;
use crate::series::Series;

/// Per-factor sensitivity of a return series.
#[derive(Clone, Debug, PartialEq)]
pub struct FactorExposure {
  /// `(factor name, coefficient)` in [`FACTOR_NAMES`] order.
  pub loadings: Vec<(String, f64)>,
}

/// Regress a level series' excess returns on the factor set.
///
/// The series is differenced into period returns, inner-joined with the
/// factor table on date, and fit with an intercept. Fails with
/// `InsufficientOverlap` when fewer than `FACTOR_NAMES.len() + 2` joined
/// observations remain.
pub fn factor_exposure(series: &Series, table: &FactorTable) -> Result<FactorExposure> {
  let returns = series.pct_change();
  let k = FACTOR_NAMES.len();
  let required = k + 2;

  let by_date: HashMap<NaiveDate, usize> = table
    .dates()
    .iter()
    .enumerate()
    .map(|(i, d)| (*d, i))
    .collect();

  let mut excess = Vec::new();
  let mut design_rows = Vec::new();
  for (date, value) in returns.iter() {
    if let Some(&row) = by_date.get(&date) {
      excess.push(value - table.risk_free()[row]);
      design_rows.push(row);
    }
  }

  let observations = excess.len();
  if observations < required {
    return Err(EngineError::InsufficientOverlap {
      observations,
      required,
    });
  }

  let x = DMatrix::from_fn(observations, k + 1, |r, c| {
    if c == 0 {
      1.0
    } else {
      table.factors()[(design_rows[r], c - 1)]
    }
  });
  let y = DVector::from_vec(excess);

  let beta = x
    .svd(true, true)
    .solve(&y, f64::EPSILON)
    .map_err(|_| EngineError::InsufficientOverlap {
      observations,
      required,
    })?;

  let loadings = FACTOR_NAMES
    .iter()
    .enumerate()
    .map(|(i, name)| (name.to_string(), beta[i + 1]))
    .collect();

  Ok(FactorExposure { loadings })
}
