//! # Performance Metrics
//!
//! $$
//! \mathrm{CAGR} = \left(\frac{V_T}{V_0}\right)^{365.25/d} - 1,\qquad
//! \sigma_a = \sigma_m \sqrt{12}
//! $$
//!
//! Point metrics plus the drawdown and rolling series for one level series.

use super::drawdown::drawdown;
use super::rolling::rolling_returns;
use super::rolling::RollingReturns;
use crate::error::EngineError;
use crate::error::Result;
use crate::series::Series;

/// Days per year used for CAGR annualization.
const DAYS_PER_YEAR: f64 = 365.25;

/// Annualization factor for monthly volatility.
const PERIODS_PER_YEAR: f64 = 12.0;

/// Point metrics and derived series for one rebased level series.
#[derive(Clone, Debug)]
pub struct MetricsRecord {
  /// Compound annual growth rate, percent.
  pub cagr: f64,
  /// Annualized volatility of monthly returns, percent.
  pub volatility: f64,
  /// CAGR over volatility; 0 when volatility is exactly 0.
  pub sharpe: f64,
  /// Drawdown fractions against the running peak.
  pub drawdown: Series,
  /// One rolling result per requested window.
  pub rolling: Vec<RollingReturns>,
}

fn sample_mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

fn sample_std(xs: &[f64]) -> f64 {
  if xs.len() < 2 {
    return 0.0;
  }

  let mean = sample_mean(xs);
  let mut acc = 0.0;
  for &x in xs {
    let d = x - mean;
    acc += d * d;
  }
  (acc / (xs.len() - 1) as f64).sqrt()
}

/// Compute the full metrics record for a level series.
///
/// The series must span at least two dates; CAGR is undefined over zero
/// elapsed days.
pub fn compute_metrics(series: &Series, windows: &[usize]) -> Result<MetricsRecord> {
  let (first_date, start) = series
    .first()
    .ok_or_else(|| EngineError::empty_input("metrics of an empty series"))?;
  let (last_date, end) = series.last().expect("non-empty series has a last row");

  let days = (last_date - first_date).num_days();
  if days <= 0 {
    return Err(EngineError::empty_input(
      "metrics need a series spanning more than one date",
    ));
  }

  let cagr = ((end / start).powf(DAYS_PER_YEAR / days as f64) - 1.0) * 100.0;

  let returns = series.pct_change();
  let volatility = sample_std(returns.values()) * PERIODS_PER_YEAR.sqrt() * 100.0;
  let sharpe = if volatility == 0.0 {
    0.0
  } else {
    cagr / volatility
  };

  Ok(MetricsRecord {
    cagr,
    volatility,
    sharpe,
    drawdown: drawdown(series),
    rolling: windows
      .iter()
      .map(|w| rolling_returns(&returns, *w))
      .collect(),
  })
}
