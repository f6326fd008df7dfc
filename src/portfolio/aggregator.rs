//! # Portfolio Aggregator
//!
//! $$
//! r_{p,t} = \mathbf{w}^\top \mathbf{r}_t,\qquad
//! I_t = 100\prod_{s\le t}(1+r_{p,s})
//! $$
//!
//! Collapses an aligned asset table into one weighted portfolio series,
//! optionally joined against a benchmark and cut to a date window.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::types::PortfolioSeries;
use super::types::Weights;
use crate::error::EngineError;
use crate::error::Result;
use crate::series::AlignedTable;
use crate::series::DateWindow;
use crate::series::Series;
use crate::series::BASE_LEVEL;

/// Build the weighted portfolio index and return series.
///
/// Per-instrument returns are scaled by their weight and summed row-wise;
/// the index compounds from [`BASE_LEVEL`] at the first aligned date. A
/// benchmark is inner-joined on the portfolio calendar and both series are
/// rebased from the first shared date. A window start later than the last
/// available date collapses the window to the full range.
pub fn build_portfolio(
  table: &AlignedTable,
  weights: &Weights,
  benchmark: Option<&Series>,
  window: Option<&DateWindow>,
) -> Result<PortfolioSeries> {
  if weights.len() != table.n_instruments() {
    return Err(EngineError::DimensionMismatch {
      expected: table.n_instruments(),
      actual: weights.len(),
    });
  }
  if table.n_rows() == 0 {
    return Err(EngineError::empty_input("aligned table has no rows"));
  }

  let asset_returns = table.returns();
  let w = weights.as_slice();

  let mut level = BASE_LEVEL;
  let mut index_values = Vec::with_capacity(table.n_rows());
  index_values.push(level);
  for row in asset_returns.rows() {
    let period: f64 = row.iter().zip(w.iter()).map(|(r, w)| r * w).sum();
    level *= 1.0 + period;
    index_values.push(level);
  }

  let mut index = Series::new(table.dates().to_vec(), index_values);
  let mut bench = match benchmark {
    Some(series) => Some(join_benchmark(&mut index, series)?),
    None => None,
  };

  if let Some(window) = window {
    apply_window(&mut index, &mut bench, window)?;
  }

  Ok(PortfolioSeries {
    returns: index.pct_change(),
    index,
    benchmark: bench,
  })
}

/// Pearson correlation of per-instrument returns, instrument order of the
/// table. Diagonal is exactly 1.
pub fn correlation(table: &AlignedTable) -> Vec<Vec<f64>> {
  let returns = table.returns();
  let n = table.n_instruments();
  let columns: Vec<Vec<f64>> = (0..n).map(|j| returns.column(j).to_vec()).collect();
  let mut corr = vec![vec![1.0; n]; n];

  for i in 0..n {
    for j in (i + 1)..n {
      let r = pearson(&columns[i], &columns[j]);
      corr[i][j] = r;
      corr[j][i] = r;
    }
  }

  corr
}

fn sample_mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
  let n = x.len().min(y.len());
  if n < 2 {
    return 0.0;
  }

  let mx = sample_mean(x);
  let my = sample_mean(y);

  let mut cov = 0.0;
  let mut sx = 0.0;
  let mut sy = 0.0;
  for i in 0..n {
    let dx = x[i] - mx;
    let dy = y[i] - my;
    cov += dx * dy;
    sx += dx * dx;
    sy += dy * dy;
  }

  let denom = (sx * sy).sqrt();
  if denom < 1e-15 {
    0.0
  } else {
    (cov / denom).clamp(-1.0, 1.0)
  }
}

/// Inner-join the benchmark onto the portfolio calendar and rebase both
/// series to [`BASE_LEVEL`] at the first shared date.
fn join_benchmark(index: &mut Series, benchmark: &Series) -> Result<Series> {
  let lookup: HashMap<NaiveDate, f64> = benchmark.iter().collect();

  let mut dates = Vec::new();
  let mut port = Vec::new();
  let mut bench = Vec::new();
  for (date, value) in index.iter() {
    if let Some(b) = lookup.get(&date) {
      dates.push(date);
      port.push(value);
      bench.push(*b);
    }
  }

  if dates.is_empty() {
    return Err(EngineError::empty_input(
      "benchmark shares no dates with the portfolio",
    ));
  }

  *index = Series::new(dates.clone(), port).rebase(BASE_LEVEL);
  Ok(Series::new(dates, bench).rebase(BASE_LEVEL))
}

fn apply_window(
  index: &mut Series,
  bench: &mut Option<Series>,
  window: &DateWindow,
) -> Result<()> {
  let (first, _) = index.first().expect("index is never empty here");
  let (last, _) = index.last().expect("index is never empty here");

  let start = match window.start {
    Some(s) if s > last => {
      tracing::warn!(start = %s, last = %last, "window start past available data, using full range");
      None
    }
    other => other,
  };

  if let Some(end) = window.end {
    if end < last {
      *index = index.truncate_to(end);
      if let Some(b) = bench {
        *b = b.truncate_to(end);
      }
    }
  }

  if let Some(start) = start {
    if start > first {
      *index = index.slice_from(start).rebase(BASE_LEVEL);
      if let Some(b) = bench {
        *b = b.slice_from(start).rebase(BASE_LEVEL);
      }
    }
  }

  if index.is_empty() {
    return Err(EngineError::empty_input("date window selects no rows"));
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use ndarray::Array2;

  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn table(columns: &[(&str, &[f64])], dates: &[NaiveDate]) -> AlignedTable {
    let n = dates.len();
    let k = columns.len();
    let mut values = Array2::zeros((n, k));
    for (j, (_, col)) in columns.iter().enumerate() {
      for (i, v) in col.iter().enumerate() {
        values[(i, j)] = *v;
      }
    }
    AlignedTable::new(
      dates.to_vec(),
      columns.iter().map(|(s, _)| s.to_string()).collect(),
      values,
    )
  }

  fn monthly(n: usize) -> Vec<NaiveDate> {
    (0..n)
      .map(|i| d(2020, 1 + i as u32, 1))
      .collect()
  }

  #[test]
  fn two_asset_scenario_compounds_to_expected_index() {
    let dates = monthly(3);
    let table = table(
      &[
        ("AAA", &[100.0, 110.0, 121.0]),
        ("BBB", &[100.0, 100.0, 100.0]),
      ],
      &dates,
    );
    let weights = Weights::new(vec![0.5, 0.5]).unwrap();

    let portfolio = build_portfolio(&table, &weights, None, None).unwrap();

    assert_eq!(portfolio.index.values()[0], 100.0);
    assert!((portfolio.index.values()[1] - 105.0).abs() < 1e-9);
    assert!((portfolio.index.values()[2] - 110.25).abs() < 1e-9);
    assert_eq!(portfolio.returns.len(), 2);
    assert!((portfolio.returns.values()[0] - 0.05).abs() < 1e-12);
    assert!((portfolio.returns.values()[1] - 0.05).abs() < 1e-12);
  }

  #[test]
  fn weight_count_mismatch_is_rejected() {
    let dates = monthly(2);
    let table = table(&[("AAA", &[100.0, 110.0])], &dates);
    let weights = Weights::new(vec![0.5, 0.5]).unwrap();

    assert!(matches!(
      build_portfolio(&table, &weights, None, None).unwrap_err(),
      EngineError::DimensionMismatch {
        expected: 1,
        actual: 2
      }
    ));
  }

  #[test]
  fn benchmark_is_joined_and_rebased() {
    let dates = monthly(3);
    let table = table(&[("AAA", &[100.0, 110.0, 121.0])], &dates);
    let weights = Weights::new(vec![1.0]).unwrap();
    // Benchmark missing the first portfolio date.
    let benchmark = Series::new(vec![dates[1], dates[2]], vec![50.0, 55.0]);

    let portfolio = build_portfolio(&table, &weights, Some(&benchmark), None).unwrap();
    let bench = portfolio.benchmark.unwrap();

    assert_eq!(portfolio.index.len(), 2);
    assert_eq!(portfolio.index.values()[0], 100.0);
    assert_eq!(bench.values()[0], 100.0);
    assert!((bench.values()[1] - 110.0).abs() < 1e-12);
    assert!((portfolio.index.values()[1] - 110.0).abs() < 1e-12);
  }

  #[test]
  fn disjoint_benchmark_fails() {
    let dates = monthly(2);
    let table = table(&[("AAA", &[100.0, 110.0])], &dates);
    let weights = Weights::new(vec![1.0]).unwrap();
    let benchmark = Series::new(vec![d(1999, 1, 1)], vec![1.0]);

    assert!(matches!(
      build_portfolio(&table, &weights, Some(&benchmark), None).unwrap_err(),
      EngineError::EmptyInput { .. }
    ));
  }

  #[test]
  fn window_slices_and_renormalizes_left_edge() {
    let dates = monthly(4);
    let table = table(&[("AAA", &[100.0, 110.0, 121.0, 133.1])], &dates);
    let weights = Weights::new(vec![1.0]).unwrap();
    let window = DateWindow::between(dates[1], dates[2]);

    let portfolio = build_portfolio(&table, &weights, None, Some(&window)).unwrap();

    assert_eq!(portfolio.index.len(), 2);
    assert_eq!(portfolio.index.dates()[0], dates[1]);
    assert_eq!(portfolio.index.values()[0], 100.0);
    assert!((portfolio.index.values()[1] - 110.0).abs() < 1e-9);
  }

  #[test]
  fn implausible_window_start_collapses_to_full_range() {
    let dates = monthly(3);
    let table = table(&[("AAA", &[100.0, 110.0, 121.0])], &dates);
    let weights = Weights::new(vec![1.0]).unwrap();
    let window = DateWindow::starting_at(d(2030, 1, 1));

    let portfolio = build_portfolio(&table, &weights, None, Some(&window)).unwrap();
    assert_eq!(portfolio.index.len(), 3);
  }

  #[test]
  fn rerun_is_bitwise_identical() {
    let dates = monthly(3);
    let table = table(
      &[
        ("AAA", &[100.0, 103.0, 99.0]),
        ("BBB", &[100.0, 101.0, 104.0]),
      ],
      &dates,
    );
    let weights = Weights::new(vec![0.4, 0.6]).unwrap();

    let one = build_portfolio(&table, &weights, None, None).unwrap();
    let two = build_portfolio(&table, &weights, None, None).unwrap();

    assert_eq!(one.index, two.index);
    assert_eq!(one.returns, two.returns);
  }

  #[test]
  fn correlation_is_symmetric_with_unit_diagonal() {
    let dates = monthly(4);
    let table = table(
      &[
        ("AAA", &[100.0, 110.0, 105.0, 115.0]),
        ("BBB", &[100.0, 90.0, 95.0, 85.0]),
      ],
      &dates,
    );

    let corr = correlation(&table);
    assert_eq!(corr[0][0], 1.0);
    assert_eq!(corr[1][1], 1.0);
    assert!((corr[0][1] - corr[1][0]).abs() < 1e-12);
    assert!(corr[0][1] < 0.0);
  }
}
