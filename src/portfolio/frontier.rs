//! # Efficient Frontier
//!
//! $$
//! \mu_p = \mathbf{w}^\top \mu,\qquad
//! \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}},\qquad
//! S_p = \frac{\mu_p - r_f}{\sigma_p}
//! $$
//!
//! Monte Carlo approximation of the efficient frontier: sample random
//! weight vectors, price each on annualized return/volatility, and pull out
//! the max-Sharpe, min-volatility and max-return members of the cloud.

use ndarray::Array1;
use ndarray::Array2;
use ndarray_rand::RandomExt;
use ndarray_stats::CorrelationExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Uniform;
use rayon::prelude::*;

use super::types::FrontierPoint;
use super::types::FrontierResult;
use super::types::NamedPortfolio;
use super::types::PortfolioLabel;
use crate::error::EngineError;
use crate::error::Result;
use crate::series::AlignedTable;

/// Periods per year for monthly observations.
const PERIODS_PER_YEAR: f64 = 12.0;

/// Sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct FrontierConfig {
  /// Number of weight vectors to draw.
  pub samples: usize,
  /// Risk-free rate used in the Sharpe numerator.
  pub risk_free: f64,
  /// Display floor: weights below this are dropped from presentation.
  pub weight_floor: f64,
  /// Seed for the weight draws. `None` uses thread entropy.
  pub seed: Option<u64>,
}

impl Default for FrontierConfig {
  fn default() -> Self {
    Self {
      samples: 5000,
      risk_free: 0.0,
      weight_floor: 0.05,
      seed: None,
    }
  }
}

/// Sample the frontier cloud for an aligned monthly price table.
///
/// Weight vectors are drawn Uniform[0,1) per instrument and normalized to
/// sum 1. That is not uniform over the simplex (it biases toward balanced
/// portfolios) and is kept deliberately: the sampled cloud's shape is part
/// of the observable output. Do not replace with a Dirichlet draw.
pub fn sample_frontier(table: &AlignedTable, config: &FrontierConfig) -> Result<FrontierResult> {
  let k = table.n_instruments();
  if k == 0 || table.n_rows() == 0 {
    return Err(EngineError::empty_input("frontier needs an aligned table"));
  }
  if k < 2 {
    return Err(EngineError::InsufficientAssets { available: k });
  }
  if config.samples == 0 {
    return Err(EngineError::empty_input("zero frontier samples requested"));
  }

  let monthly = table.returns();
  let n_obs = monthly.nrows();
  if n_obs < 2 {
    return Err(EngineError::empty_input(
      "need at least 2 return observations to estimate covariance",
    ));
  }

  // Geometric annualization over the observed monthly series.
  let annual: Array1<f64> = monthly
    .columns()
    .into_iter()
    .map(|col| {
      let compounded: f64 = col.iter().map(|r| 1.0 + r).product();
      compounded.powf(PERIODS_PER_YEAR / n_obs as f64) - 1.0
    })
    .collect();

  let cov = monthly
    .t()
    .cov(1.0)
    .map_err(|_| EngineError::empty_input("covariance of monthly returns"))?
    * PERIODS_PER_YEAR;

  let mut weights = draw_weights(config.samples, k, config.seed);
  normalize_rows(&mut weights);

  let risk_free = config.risk_free;
  let cloud: Vec<FrontierPoint> = (0..config.samples)
    .into_par_iter()
    .map(|i| {
      let w = weights.row(i);
      let annual_return = w.dot(&annual);
      let volatility = w.dot(&cov.dot(&w)).max(0.0).sqrt();
      let sharpe = if volatility > 0.0 {
        (annual_return - risk_free) / volatility
      } else {
        0.0
      };
      FrontierPoint {
        annual_return,
        volatility,
        sharpe,
        weights: w.to_vec(),
      }
    })
    .collect();

  let mut max_sharpe = 0;
  let mut min_volatility = 0;
  let mut max_return = 0;
  for (i, point) in cloud.iter().enumerate() {
    if point.sharpe > cloud[max_sharpe].sharpe {
      max_sharpe = i;
    }
    if point.volatility < cloud[min_volatility].volatility {
      min_volatility = i;
    }
    if point.annual_return > cloud[max_return].annual_return {
      max_return = i;
    }
  }

  tracing::debug!(
    samples = config.samples,
    instruments = k,
    observations = n_obs,
    "sampled frontier cloud"
  );

  Ok(FrontierResult {
    max_sharpe: name_portfolio(PortfolioLabel::MaxSharpe, &cloud[max_sharpe], table, config),
    min_volatility: name_portfolio(
      PortfolioLabel::MinVolatility,
      &cloud[min_volatility],
      table,
      config,
    ),
    max_return: name_portfolio(PortfolioLabel::MaxReturn, &cloud[max_return], table, config),
    cloud,
  })
}

fn draw_weights(samples: usize, k: usize, seed: Option<u64>) -> Array2<f64> {
  let uniform = Uniform::new(0.0, 1.0);
  match seed {
    Some(seed) => {
      let mut rng = StdRng::seed_from_u64(seed);
      Array2::random_using((samples, k), uniform, &mut rng)
    }
    None => Array2::random_using((samples, k), uniform, &mut rand::thread_rng()),
  }
}

fn normalize_rows(weights: &mut Array2<f64>) {
  let k = weights.ncols();
  for mut row in weights.rows_mut() {
    let sum: f64 = row.sum();
    if sum < 1e-15 {
      row.fill(1.0 / k as f64);
    } else {
      row.mapv_inplace(|w| w / sum);
    }
  }
}

/// Presentation transform: drop weights under the floor and rescale the
/// survivors to sum 1. Never fed back into the cloud metrics.
fn display_weights(point: &FrontierPoint, table: &AlignedTable, floor: f64) -> Vec<(String, f64)> {
  let retained: Vec<(String, f64)> = table
    .symbols()
    .iter()
    .zip(point.weights.iter())
    .filter(|(_, w)| **w >= floor)
    .map(|(s, w)| (s.clone(), *w))
    .collect();

  let total: f64 = retained.iter().map(|(_, w)| w).sum();
  if retained.is_empty() || total <= 0.0 {
    // Everything under the floor: present the raw vector unscaled.
    return table
      .symbols()
      .iter()
      .cloned()
      .zip(point.weights.iter().copied())
      .collect();
  }

  retained
    .into_iter()
    .map(|(s, w)| (s, w / total))
    .collect()
}

fn name_portfolio(
  label: PortfolioLabel,
  point: &FrontierPoint,
  table: &AlignedTable,
  config: &FrontierConfig,
) -> NamedPortfolio {
  NamedPortfolio {
    label,
    point: point.clone(),
    display_weights: display_weights(point, table, config.weight_floor),
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn table(columns: &[(&str, &[f64])]) -> AlignedTable {
    let n = columns[0].1.len();
    let k = columns.len();
    let mut values = Array2::zeros((n, k));
    for (j, (_, col)) in columns.iter().enumerate() {
      for (i, v) in col.iter().enumerate() {
        values[(i, j)] = *v;
      }
    }
    let dates = (0..n).map(|i| d(2015 + i as i32 / 12, 1 + (i % 12) as u32, 1)).collect();
    AlignedTable::new(
      dates,
      columns.iter().map(|(s, _)| s.to_string()).collect(),
      values,
    )
  }

  fn seeded(samples: usize) -> FrontierConfig {
    FrontierConfig {
      samples,
      seed: Some(7),
      ..FrontierConfig::default()
    }
  }

  #[test]
  fn single_instrument_is_rejected() {
    let table = table(&[("AAA", &[100.0, 101.0, 102.0])]);
    assert!(matches!(
      sample_frontier(&table, &FrontierConfig::default()).unwrap_err(),
      EngineError::InsufficientAssets { available: 1 }
    ));
  }

  #[test]
  fn sampled_weights_stay_on_the_simplex() {
    let table = table(&[
      ("AAA", &[100.0, 102.0, 101.0, 105.0, 107.0]),
      ("BBB", &[100.0, 99.0, 103.0, 102.0, 104.0]),
      ("CCC", &[100.0, 101.0, 100.0, 103.0, 101.0]),
    ]);

    let result = sample_frontier(&table, &seeded(200)).unwrap();
    assert_eq!(result.cloud.len(), 200);

    for point in &result.cloud {
      let sum: f64 = point.weights.iter().sum();
      assert!((sum - 1.0).abs() < 1e-9);
      assert!(point.weights.iter().all(|w| *w >= 0.0));
      assert!(point.volatility >= 0.0);
    }
  }

  #[test]
  fn named_portfolios_are_cloud_members() {
    let table = table(&[
      ("AAA", &[100.0, 104.0, 103.0, 108.0, 110.0]),
      ("BBB", &[100.0, 98.0, 101.0, 99.0, 102.0]),
    ]);

    let result = sample_frontier(&table, &seeded(500)).unwrap();
    for named in [
      &result.max_sharpe,
      &result.min_volatility,
      &result.max_return,
    ] {
      assert!(result.cloud.iter().any(|p| p == &named.point));
    }

    let best = &result.max_sharpe.point.sharpe;
    assert!(result.cloud.iter().all(|p| p.sharpe <= *best));
  }

  #[test]
  fn same_seed_reproduces_the_cloud() {
    let table = table(&[
      ("AAA", &[100.0, 102.0, 104.0, 103.0]),
      ("BBB", &[100.0, 101.0, 99.0, 102.0]),
    ]);

    let one = sample_frontier(&table, &seeded(50)).unwrap();
    let two = sample_frontier(&table, &seeded(50)).unwrap();
    assert_eq!(one.cloud, two.cloud);
  }

  #[test]
  fn display_weights_drop_and_rescale_small_positions() {
    let table = table(&[
      ("AAA", &[100.0, 101.0, 102.0]),
      ("BBB", &[100.0, 102.0, 104.0]),
      ("CCC", &[100.0, 100.5, 101.0]),
    ]);
    let point = FrontierPoint {
      annual_return: 0.05,
      volatility: 0.1,
      sharpe: 0.5,
      weights: vec![0.48, 0.49, 0.03],
    };

    let display = display_weights(&point, &table, 0.05);
    assert_eq!(display.len(), 2);
    let total: f64 = display.iter().map(|(_, w)| w).sum();
    assert!((total - 1.0).abs() < 1e-12);
    assert!((display[0].1 - 0.48 / 0.97).abs() < 1e-12);
  }

  #[test]
  fn annualization_matches_hand_computation() {
    // Flat second asset so portfolio math stays easy to verify by hand.
    let table = table(&[
      ("AAA", &[100.0, 110.0, 121.0]),
      ("BBB", &[100.0, 100.0, 100.0]),
    ]);

    let result = sample_frontier(&table, &seeded(100)).unwrap();
    // Max return concentrates toward AAA whose annual return is
    // 1.1^(12/2) - 1. No sampled portfolio can exceed it.
    let cap = 1.1f64.powf(6.0) - 1.0;
    assert!(result.max_return.point.annual_return <= cap + 1e-9);
    assert!(result.max_return.point.annual_return > 0.0);
  }
}
