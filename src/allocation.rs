//! # Allocation
//!
//! $$
//! A_c = 100\cdot\frac{\sum_{i \in c} a_i w_i}{\sum_{j} a_j w_j}
//! $$
//!
//! Rolls per-instrument category shares (country or sector) up to the
//! portfolio level and renormalizes the grouped totals to 100.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;

use crate::error::EngineError;
use crate::error::Result;
use crate::portfolio::Weights;

/// Category label reported when nothing in the mapping matches.
pub const NO_DATA_LABEL: &str = "No data";

/// One raw mapping entry: an instrument's share in a category.
#[derive(Clone, Debug, PartialEq)]
pub struct MappingRow {
  pub instrument: String,
  pub category: String,
  /// Raw allocation share as published, percent scale.
  pub share: f64,
}

/// Static instrument-to-category reference table.
///
/// Duplicate `(instrument, category)` rows are tolerated here and resolved
/// at rollup time, keeping the first occurrence.
#[derive(Clone, Debug, Default)]
pub struct MappingTable {
  rows: Vec<MappingRow>,
}

impl MappingTable {
  /// Wrap raw mapping rows.
  pub fn new(rows: Vec<MappingRow>) -> Self {
    Self { rows }
  }

  /// All rows in input order.
  pub fn rows(&self) -> &[MappingRow] {
    &self.rows
  }

  /// Number of rows.
  pub fn len(&self) -> usize {
    self.rows.len()
  }

  /// Check if empty.
  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}

/// Category breakdown summing to 100, sorted by category name.
#[derive(Clone, Debug, PartialEq)]
pub struct AllocationTable {
  /// `(category, weight percent)` entries.
  pub entries: Vec<(String, f64)>,
}

impl AllocationTable {
  fn no_data() -> Self {
    Self {
      entries: vec![(NO_DATA_LABEL.to_string(), 100.0)],
    }
  }

  /// Sum of the entries. 100 up to float noise.
  pub fn total(&self) -> f64 {
    self.entries.iter().map(|(_, w)| w).sum()
  }
}

/// Roll the mapping up to a weighted portfolio-level breakdown.
///
/// Rows for instruments outside the portfolio are ignored; when nothing
/// matches (or every weighted share degenerates to zero) the synthetic
/// [`NO_DATA_LABEL`] row is returned instead of failing.
pub fn rollup(
  mapping: &MappingTable,
  instruments: &[String],
  weights: &Weights,
) -> Result<AllocationTable> {
  if weights.len() != instruments.len() {
    return Err(EngineError::DimensionMismatch {
      expected: instruments.len(),
      actual: weights.len(),
    });
  }

  let weight_of: HashMap<&str, f64> = instruments
    .iter()
    .map(String::as_str)
    .zip(weights.as_slice().iter().copied())
    .collect();

  let mut seen: HashSet<(&str, &str)> = HashSet::new();
  let mut grouped: BTreeMap<&str, f64> = BTreeMap::new();
  let mut matched = false;

  for row in mapping.rows() {
    let Some(weight) = weight_of.get(row.instrument.as_str()) else {
      continue;
    };
    matched = true;
    if !seen.insert((row.instrument.as_str(), row.category.as_str())) {
      continue;
    }
    *grouped.entry(row.category.as_str()).or_insert(0.0) += row.share * weight;
  }

  if !matched {
    tracing::warn!("no mapping rows matched the portfolio instruments");
    return Ok(AllocationTable::no_data());
  }

  let total: f64 = grouped.values().sum();
  if total <= 0.0 {
    tracing::warn!(total, "weighted allocation degenerated to zero");
    return Ok(AllocationTable::no_data());
  }

  Ok(AllocationTable {
    entries: grouped
      .into_iter()
      .map(|(category, value)| (category.to_string(), 100.0 * value / total))
      .collect(),
  })
}
