//! # Alignment
//!
//! Joins per-instrument price histories onto the calendar they all share
//! and rebases every column to a common base level.

use std::collections::HashMap;

use chrono::NaiveDate;
use ndarray::Array2;

use super::table::AlignedTable;
use super::table::PriceSeries;
use crate::error::EngineError;
use crate::error::Result;

/// Which instrument limits the usable history, and from when.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignmentNote {
  /// Earliest date every instrument has data for.
  pub first_usable: NaiveDate,
  /// Instrument whose own history starts last.
  pub constrained_by: String,
}

/// Align price series on the intersection of their calendars.
///
/// A date survives only if every series has an observation for it, so the
/// usable range starts at the latest of the per-series first dates. The
/// returned [`AlignmentNote`] names that constraining instrument; on ties
/// the first one encountered in input order wins. Every column of the
/// result is rebased to start at [`BASE_LEVEL`](super::table::BASE_LEVEL).
pub fn align(series: &[PriceSeries]) -> Result<(AlignedTable, AlignmentNote)> {
  if series.is_empty() {
    return Err(EngineError::empty_input("no price series supplied"));
  }

  let mut first_usable = series[0].first_date();
  let mut constrained_by = series[0].symbol().to_string();
  for s in &series[1..] {
    if s.first_date() > first_usable {
      first_usable = s.first_date();
      constrained_by = s.symbol().to_string();
    }
  }

  let lookups: Vec<HashMap<NaiveDate, f64>> = series
    .iter()
    .map(|s| s.observations().iter().copied().collect())
    .collect();

  // The first series' calendar is already sorted; keep the dates every
  // other series can serve.
  let dates: Vec<NaiveDate> = series[0]
    .observations()
    .iter()
    .map(|(date, _)| *date)
    .filter(|date| lookups[1..].iter().all(|m| m.contains_key(date)))
    .collect();

  if dates.is_empty() {
    return Err(EngineError::empty_input(
      "price series share no common dates",
    ));
  }

  let symbols: Vec<String> = series.iter().map(|s| s.symbol().to_string()).collect();
  let values = Array2::from_shape_fn((dates.len(), series.len()), |(i, j)| lookups[j][&dates[i]]);

  tracing::debug!(
    rows = dates.len(),
    instruments = symbols.len(),
    first_usable = %first_usable,
    constrained_by = %constrained_by,
    "aligned price series"
  );

  let table = AlignedTable::new(dates, symbols, values).rebase();
  Ok((
    table,
    AlignmentNote {
      first_usable,
      constrained_by,
    },
  ))
}
