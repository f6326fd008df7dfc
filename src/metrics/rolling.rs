//! # Rolling Returns
//!
//! $$
//! R_t^{(w)} = \prod_{s=t-w+1}^{t}(1+r_s) - 1
//! $$

use crate::series::Series;

/// Trailing compounded return over a fixed window, or an explicit marker
/// when the input is too short for even one window.
#[derive(Clone, Debug, PartialEq)]
pub enum RollingReturns {
  /// One value per date from the `window`-th return onward.
  Window { window: usize, series: Series },
  /// The series has fewer return observations than the window.
  InsufficientHistory { window: usize, available: usize },
}

/// Compute trailing compounded returns of `returns` for one window length.
pub fn rolling_returns(returns: &Series, window: usize) -> RollingReturns {
  let n = returns.len();
  if window == 0 || n < window {
    return RollingReturns::InsufficientHistory {
      window,
      available: n,
    };
  }

  let mut dates = Vec::with_capacity(n - window + 1);
  let mut values = Vec::with_capacity(n - window + 1);
  for t in (window - 1)..n {
    let compounded: f64 = returns.values()[t + 1 - window..=t]
      .iter()
      .map(|r| 1.0 + r)
      .product();
    dates.push(returns.dates()[t]);
    values.push(compounded - 1.0);
  }

  RollingReturns::Window {
    window,
    series: Series::new(dates, values),
  }
}
