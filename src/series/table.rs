//! # Series Containers
//!
//! Date-indexed containers shared by every component: raw per-instrument
//! price histories, the aligned multi-instrument table and the single
//! `(date, value)` series used for returns and rebased index levels.

use chrono::NaiveDate;
use ndarray::Array2;

use crate::error::EngineError;
use crate::error::Result;

/// Base level every rebased series starts from.
pub const BASE_LEVEL: f64 = 100.0;

/// Raw price history for one instrument.
///
/// Construction sorts observations by date and drops duplicate dates,
/// keeping the first occurrence, so downstream code can rely on a strictly
/// increasing calendar.
#[derive(Clone, Debug)]
pub struct PriceSeries {
  symbol: String,
  observations: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
  /// Build a price series from unordered raw observations.
  pub fn new(symbol: impl Into<String>, mut observations: Vec<(NaiveDate, f64)>) -> Result<Self> {
    let symbol = symbol.into();
    if observations.is_empty() {
      return Err(EngineError::empty_input(format!(
        "price series `{symbol}` has no observations"
      )));
    }

    observations.sort_by_key(|(date, _)| *date);
    observations.dedup_by_key(|(date, _)| *date);

    Ok(Self {
      symbol,
      observations,
    })
  }

  /// Instrument symbol.
  pub fn symbol(&self) -> &str {
    &self.symbol
  }

  /// Sorted, de-duplicated observations.
  pub fn observations(&self) -> &[(NaiveDate, f64)] {
    &self.observations
  }

  /// First date with data.
  pub fn first_date(&self) -> NaiveDate {
    self.observations[0].0
  }

  /// Number of observations.
  pub fn len(&self) -> usize {
    self.observations.len()
  }

  /// Check if empty. Always false for a constructed series.
  pub fn is_empty(&self) -> bool {
    self.observations.is_empty()
  }

  /// View the history as a plain [`Series`].
  pub fn to_series(&self) -> Series {
    let (dates, values) = self.observations.iter().copied().unzip();
    Series::new(dates, values)
  }
}

/// A single date-indexed value series.
///
/// Values are either period returns (fractions) or rebased index levels,
/// depending on which operation produced the series.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
  dates: Vec<NaiveDate>,
  values: Vec<f64>,
}

impl Series {
  /// Create a new series. Dates and values must have equal length.
  pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
    debug_assert_eq!(dates.len(), values.len());
    Self { dates, values }
  }

  /// Create an empty series.
  pub fn empty() -> Self {
    Self {
      dates: Vec::new(),
      values: Vec::new(),
    }
  }

  /// Dates of the series.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Values of the series.
  pub fn values(&self) -> &[f64] {
    &self.values
  }

  /// Number of observations.
  pub fn len(&self) -> usize {
    self.values.len()
  }

  /// Check if empty.
  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// First `(date, value)` pair.
  pub fn first(&self) -> Option<(NaiveDate, f64)> {
    self.dates.first().map(|d| (*d, self.values[0]))
  }

  /// Last `(date, value)` pair.
  pub fn last(&self) -> Option<(NaiveDate, f64)> {
    self
      .dates
      .last()
      .map(|d| (*d, self.values[self.values.len() - 1]))
  }

  /// Iterator over `(date, value)` pairs.
  pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
    self.dates.iter().copied().zip(self.values.iter().copied())
  }

  /// Period-over-period simple returns. The first row is dropped.
  pub fn pct_change(&self) -> Series {
    let mut dates = Vec::with_capacity(self.len().saturating_sub(1));
    let mut values = Vec::with_capacity(self.len().saturating_sub(1));

    for i in 1..self.len() {
      dates.push(self.dates[i]);
      values.push(self.values[i] / self.values[i - 1] - 1.0);
    }

    Series::new(dates, values)
  }

  /// Rescale so the first value equals `base`. No-op on an empty series.
  pub fn rebase(&self, base: f64) -> Series {
    match self.values.first() {
      None => self.clone(),
      Some(&first) => Series::new(
        self.dates.clone(),
        self.values.iter().map(|v| v / first * base).collect(),
      ),
    }
  }

  /// Keep observations with `date >= start`.
  pub fn slice_from(&self, start: NaiveDate) -> Series {
    let idx = self.dates.partition_point(|d| *d < start);
    Series::new(self.dates[idx..].to_vec(), self.values[idx..].to_vec())
  }

  /// Keep observations with `date <= end`.
  pub fn truncate_to(&self, end: NaiveDate) -> Series {
    let idx = self.dates.partition_point(|d| *d <= end);
    Series::new(self.dates[..idx].to_vec(), self.values[..idx].to_vec())
  }
}

/// Optional closed date window applied to aligned data.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateWindow {
  /// Inclusive left edge. `None` keeps the natural start.
  pub start: Option<NaiveDate>,
  /// Inclusive right edge. `None` keeps the natural end.
  pub end: Option<NaiveDate>,
}

impl DateWindow {
  /// Window with both edges set.
  pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
    Self {
      start: Some(start),
      end: Some(end),
    }
  }

  /// Window with only the left edge set.
  pub fn starting_at(start: NaiveDate) -> Self {
    Self {
      start: Some(start),
      end: None,
    }
  }
}

/// Gap-free multi-instrument price table on a shared calendar.
///
/// Rows are dates in strictly increasing order, columns are instruments in
/// input order, every column rebased so its first row is [`BASE_LEVEL`].
#[derive(Clone, Debug)]
pub struct AlignedTable {
  dates: Vec<NaiveDate>,
  symbols: Vec<String>,
  values: Array2<f64>,
}

impl AlignedTable {
  pub(crate) fn new(dates: Vec<NaiveDate>, symbols: Vec<String>, values: Array2<f64>) -> Self {
    debug_assert_eq!(dates.len(), values.nrows());
    debug_assert_eq!(symbols.len(), values.ncols());
    Self {
      dates,
      symbols,
      values,
    }
  }

  /// Shared calendar.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Instrument symbols in column order.
  pub fn symbols(&self) -> &[String] {
    &self.symbols
  }

  /// Rebased price levels, rows = dates, columns = instruments.
  pub fn values(&self) -> &Array2<f64> {
    &self.values
  }

  /// Number of dates.
  pub fn n_rows(&self) -> usize {
    self.dates.len()
  }

  /// Number of instruments.
  pub fn n_instruments(&self) -> usize {
    self.symbols.len()
  }

  /// One instrument's column as a [`Series`].
  pub fn column(&self, idx: usize) -> Series {
    Series::new(self.dates.clone(), self.values.column(idx).to_vec())
  }

  /// Per-instrument simple returns, `(n_rows - 1) x n_instruments`.
  pub fn returns(&self) -> Array2<f64> {
    let rows = self.n_rows().saturating_sub(1);
    Array2::from_shape_fn((rows, self.n_instruments()), |(i, j)| {
      self.values[(i + 1, j)] / self.values[(i, j)] - 1.0
    })
  }

  /// Rescale every column so its first row equals [`BASE_LEVEL`].
  pub fn rebase(&self) -> AlignedTable {
    if self.n_rows() == 0 {
      return self.clone();
    }

    let mut values = self.values.clone();
    for mut col in values.columns_mut() {
      let first = col[0];
      col.mapv_inplace(|v| v / first * BASE_LEVEL);
    }

    AlignedTable::new(self.dates.clone(), self.symbols.clone(), values)
  }

  /// Apply a date window, renormalizing whenever the first row changes.
  ///
  /// A window start later than the last available date collapses the window
  /// to the full range. A right edge past the last date is a no-op.
  pub fn window(&self, window: &DateWindow) -> Result<AlignedTable> {
    let (first, last) = match (self.dates.first(), self.dates.last()) {
      (Some(f), Some(l)) => (*f, *l),
      _ => return Err(EngineError::empty_input("windowing an empty table")),
    };

    let start = match window.start {
      Some(s) if s > last => {
        tracing::warn!(start = %s, last = %last, "window start past available data, using full range");
        None
      }
      other => other,
    };

    let lo = match start {
      Some(s) if s > first => self.dates.partition_point(|d| *d < s),
      _ => 0,
    };
    let hi = match window.end {
      Some(e) if e < last => self.dates.partition_point(|d| *d <= e),
      _ => self.n_rows(),
    };

    if lo >= hi {
      return Err(EngineError::empty_input("date window selects no rows"));
    }

    let sliced = AlignedTable::new(
      self.dates[lo..hi].to_vec(),
      self.symbols.clone(),
      self.values.slice(ndarray::s![lo..hi, ..]).to_owned(),
    );

    // Slice first, then renormalize: only a moved left edge changes row 0.
    if lo > 0 {
      Ok(sliced.rebase())
    } else {
      Ok(sliced)
    }
  }
}
