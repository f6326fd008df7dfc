//! # Drawdown
//!
//! $$
//! DD_t = \frac{V_t - \max_{s \le t} V_s}{\max_{s \le t} V_s}
//! $$

use crate::series::Series;

/// Drawdown of a level series against its running peak.
///
/// Values are fractions, always `<= 0`, exactly 0 at every running maximum.
pub fn drawdown(series: &Series) -> Series {
  let mut values = Vec::with_capacity(series.len());
  let mut peak = f64::NEG_INFINITY;

  for v in series.values() {
    if *v > peak {
      peak = *v;
    }
    values.push((v - peak) / peak);
  }

  Series::new(series.dates().to_vec(), values)
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn level_series(values: &[f64]) -> Series {
    let dates = (0..values.len())
      .map(|i| NaiveDate::from_ymd_opt(2020, 1 + i as u32, 1).unwrap())
      .collect();
    Series::new(dates, values.to_vec())
  }

  #[test]
  fn never_positive_and_zero_at_peaks() {
    let dd = drawdown(&level_series(&[100.0, 110.0, 105.0, 120.0, 100.0]));

    assert!(dd.values().iter().all(|v| *v <= 0.0));
    assert_eq!(dd.values()[0], 0.0);
    assert_eq!(dd.values()[1], 0.0);
    assert_eq!(dd.values()[3], 0.0);
    assert!((dd.values()[2] - (105.0 - 110.0) / 110.0).abs() < 1e-12);
    assert!((dd.values()[4] - (100.0 - 120.0) / 120.0).abs() < 1e-12);
  }

  #[test]
  fn empty_series_stays_empty() {
    assert!(drawdown(&Series::empty()).is_empty());
  }
}
