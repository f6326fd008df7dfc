//! # Portfolio Types
//!
//! $$
//! \sum_i w_i = 1,\qquad w_i \in (0, 1]
//! $$
//!
//! Validated weight vectors and result containers shared by the aggregator
//! and the frontier sampler.

use crate::error::EngineError;
use crate::error::Result;
use crate::series::Series;

/// Tolerance on the weight-vector sum.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Long-only weight vector summing to one.
///
/// Order matches the instrument order of the table the weights are applied
/// to; the pairing is checked at the point of use, not here.
#[derive(Clone, Debug, PartialEq)]
pub struct Weights(Vec<f64>);

impl Weights {
  /// Validate and wrap a raw weight vector.
  pub fn new(weights: Vec<f64>) -> Result<Self> {
    if weights.is_empty() {
      return Err(EngineError::invalid_weights("weight vector is empty"));
    }

    for (i, w) in weights.iter().enumerate() {
      if !w.is_finite() || *w <= 0.0 || *w > 1.0 {
        return Err(EngineError::invalid_weights(format!(
          "weight {i} is {w}, expected a value in (0, 1]"
        )));
      }
    }

    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
      return Err(EngineError::invalid_weights(format!(
        "weights sum to {sum}, expected 1.0"
      )));
    }

    Ok(Self(weights))
  }

  /// Weight values.
  pub fn as_slice(&self) -> &[f64] {
    &self.0
  }

  /// Number of weights.
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Check if empty. Always false for a constructed vector.
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Weighted portfolio output of the aggregator.
#[derive(Clone, Debug)]
pub struct PortfolioSeries {
  /// Compounded index level, first row exactly 100.
  pub index: Series,
  /// Per-period portfolio returns over the same (final) window.
  pub returns: Series,
  /// Benchmark rebased onto the portfolio calendar, when one was supplied.
  pub benchmark: Option<Series>,
}

/// One sampled portfolio on the risk/return plane.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontierPoint {
  /// Annualized return.
  pub annual_return: f64,
  /// Annualized volatility.
  pub volatility: f64,
  /// Sharpe ratio at zero risk-free rate.
  pub sharpe: f64,
  /// Sampled weights, one per instrument.
  pub weights: Vec<f64>,
}

/// Labels of the three reference portfolios pulled from the cloud.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortfolioLabel {
  MaxSharpe,
  MinVolatility,
  MaxReturn,
}

/// A reference portfolio with its presentation weights.
#[derive(Clone, Debug)]
pub struct NamedPortfolio {
  pub label: PortfolioLabel,
  /// The exact cloud member this portfolio was selected from.
  pub point: FrontierPoint,
  /// Per-symbol weights after the small-position display transform.
  pub display_weights: Vec<(String, f64)>,
}

/// Full output of the frontier sampler.
#[derive(Clone, Debug)]
pub struct FrontierResult {
  /// Every sampled portfolio, in sample order.
  pub cloud: Vec<FrontierPoint>,
  pub max_sharpe: NamedPortfolio,
  pub min_volatility: NamedPortfolio,
  pub max_return: NamedPortfolio,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_weights_summing_to_one() {
    let w = Weights::new(vec![0.25, 0.25, 0.5]).unwrap();
    assert_eq!(w.len(), 3);
  }

  #[test]
  fn rejects_bad_sums_and_ranges() {
    assert!(matches!(
      Weights::new(vec![0.5, 0.6]).unwrap_err(),
      EngineError::InvalidWeights { .. }
    ));
    assert!(matches!(
      Weights::new(vec![1.2, -0.2]).unwrap_err(),
      EngineError::InvalidWeights { .. }
    ));
    assert!(matches!(
      Weights::new(vec![]).unwrap_err(),
      EngineError::InvalidWeights { .. }
    ));
  }

  #[test]
  fn tolerates_rounding_noise() {
    let third = 1.0 / 3.0;
    assert!(Weights::new(vec![third, third, third]).is_ok());
  }
}
