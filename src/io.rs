//! # Io
//!
//! CSV loaders for the collaborator-supplied tables: per-instrument price
//! histories, the monthly factor table and the instrument-to-category
//! mapping tables. Everything is read once at startup by the caller and
//! handed to the engine as immutable reference data.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use ndarray::Array2;

use crate::allocation::MappingRow;
use crate::allocation::MappingTable;
use crate::error::EngineError;
use crate::error::Result;
use crate::factors::FactorTable;
use crate::factors::FACTOR_NAMES;
use crate::factors::RISK_FREE_NAME;
use crate::series::PriceSeries;

const DATE_COLUMN: &str = "Date";
const INSTRUMENT_COLUMN: &str = "Index";
const ALLOCATION_COLUMN: &str = "Allocation";

fn table_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string())
}

fn open(path: &Path) -> Result<csv::Reader<File>> {
  let file = File::open(path).map_err(|source| EngineError::Io {
    path: path.display().to_string(),
    source,
  })?;
  Ok(csv::Reader::from_reader(file))
}

fn column_index(headers: &csv::StringRecord, name: &str, table: &str) -> Result<usize> {
  headers
    .iter()
    .position(|h| h.trim() == name)
    .ok_or_else(|| EngineError::schema(table, format!("missing column `{name}`")))
}

/// Accepts `2020-01-31` and month-granular `2020-01` stamps.
fn parse_date(raw: &str, table: &str) -> Result<NaiveDate> {
  let raw = raw.trim();
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
    .map_err(|_| EngineError::schema(table, format!("unparseable date `{raw}`")))
}

fn parse_value(raw: &str, table: &str) -> Result<f64> {
  raw
    .trim()
    .parse()
    .map_err(|_| EngineError::schema(table, format!("unparseable value `{raw}`")))
}

/// Read one instrument's price history.
///
/// The file needs a `Date` column; prices come from the column named after
/// the symbol when present, otherwise from the first non-date column.
pub fn read_price_csv(path: &Path, symbol: &str) -> Result<PriceSeries> {
  let table = table_name(path);
  let mut reader = open(path)?;
  let headers = reader
    .headers()
    .map_err(|e| EngineError::schema(&table, e.to_string()))?
    .clone();

  let date_idx = column_index(&headers, DATE_COLUMN, &table)?;
  let price_idx = headers
    .iter()
    .position(|h| h.trim() == symbol)
    .or_else(|| (0..headers.len()).find(|i| *i != date_idx))
    .ok_or_else(|| EngineError::schema(&table, "no price column"))?;

  let mut observations = Vec::new();
  for record in reader.records() {
    let record = record.map_err(|e| EngineError::schema(&table, e.to_string()))?;
    let date = parse_date(&record[date_idx], &table)?;
    let price = parse_value(&record[price_idx], &table)?;
    observations.push((date, price));
  }

  PriceSeries::new(symbol, observations)
}

/// Read the monthly factor table. Percent-quoted values are converted to
/// fractions here, exactly once.
pub fn read_factor_csv(path: &Path) -> Result<FactorTable> {
  let table = table_name(path);
  let mut reader = open(path)?;
  let headers = reader
    .headers()
    .map_err(|e| EngineError::schema(&table, e.to_string()))?
    .clone();

  let date_idx = column_index(&headers, DATE_COLUMN, &table)?;
  let factor_idx: Vec<usize> = FACTOR_NAMES
    .iter()
    .map(|name| column_index(&headers, name, &table))
    .collect::<Result<_>>()?;
  let rf_idx = column_index(&headers, RISK_FREE_NAME, &table)?;

  let mut dates = Vec::new();
  let mut values = Vec::new();
  let mut risk_free = Vec::new();
  for record in reader.records() {
    let record = record.map_err(|e| EngineError::schema(&table, e.to_string()))?;
    dates.push(parse_date(&record[date_idx], &table)?);
    for idx in &factor_idx {
      values.push(parse_value(&record[*idx], &table)? / 100.0);
    }
    risk_free.push(parse_value(&record[rf_idx], &table)? / 100.0);
  }

  let rows = dates.len();
  let factors = Array2::from_shape_vec((rows, FACTOR_NAMES.len()), values)
    .map_err(|e| EngineError::schema(&table, e.to_string()))?;
  FactorTable::new(dates, factors, risk_free)
}

/// Read an instrument-to-category mapping table.
///
/// `category_column` names the middle column, `Country` or `Sector` in the
/// published files.
pub fn read_mapping_csv(path: &Path, category_column: &str) -> Result<MappingTable> {
  let table = table_name(path);
  let mut reader = open(path)?;
  let headers = reader
    .headers()
    .map_err(|e| EngineError::schema(&table, e.to_string()))?
    .clone();

  let instrument_idx = column_index(&headers, INSTRUMENT_COLUMN, &table)?;
  let category_idx = column_index(&headers, category_column, &table)?;
  let share_idx = column_index(&headers, ALLOCATION_COLUMN, &table)?;

  let mut rows = Vec::new();
  for record in reader.records() {
    let record = record.map_err(|e| EngineError::schema(&table, e.to_string()))?;
    rows.push(MappingRow {
      instrument: record[instrument_idx].trim().to_string(),
      category: record[category_idx].trim().to_string(),
      share: parse_value(&record[share_idx], &table)?,
    });
  }

  Ok(MappingTable::new(rows))
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use tempfile::NamedTempFile;

  use super::*;

  fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
  }

  #[test]
  fn price_csv_round_trips() {
    let file = write_csv("Date,MSCI World\n2020-01-31,100.5\n2020-02-29,98.2\n");
    let series = read_price_csv(file.path(), "MSCI World").unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series.observations()[0].1, 100.5);
    assert_eq!(
      series.first_date(),
      NaiveDate::from_ymd_opt(2020, 1, 31).unwrap()
    );
  }

  #[test]
  fn price_csv_falls_back_to_first_value_column() {
    let file = write_csv("Date,Close\n2020-01,100.0\n2020-02,101.0\n");
    let series = read_price_csv(file.path(), "SYMBOL").unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(
      series.first_date(),
      NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    );
  }

  #[test]
  fn factor_csv_divides_percent_once() {
    let file = write_csv(
      "Date,Mkt-RF,SMB,HML,RMW,CMA,RF\n2020-01,1.5,0.2,-0.3,0.1,0.0,0.05\n",
    );
    let table = read_factor_csv(file.path()).unwrap();

    assert_eq!(table.len(), 1);
    assert!((table.factors()[(0, 0)] - 0.015).abs() < 1e-12);
    assert!((table.risk_free()[0] - 0.0005).abs() < 1e-12);
  }

  #[test]
  fn factor_csv_missing_column_is_schema_error() {
    let file = write_csv("Date,Mkt-RF,SMB,HML,RMW,CMA\n2020-01,1,2,3,4,5\n");
    assert!(matches!(
      read_factor_csv(file.path()).unwrap_err(),
      EngineError::Schema { .. }
    ));
  }

  #[test]
  fn mapping_csv_requires_the_three_columns() {
    let file = write_csv("Index,Country,Allocation\nIDX,US,65.2\nIDX,JP,34.8\n");
    let mapping = read_mapping_csv(file.path(), "Country").unwrap();
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping.rows()[1].category, "JP");

    let broken = write_csv("Index,Allocation\nIDX,100\n");
    assert!(matches!(
      read_mapping_csv(broken.path(), "Country").unwrap_err(),
      EngineError::Schema { .. }
    ));
  }

  #[test]
  fn missing_file_is_io_error() {
    let err = read_price_csv(Path::new("/nonexistent/prices.csv"), "X").unwrap_err();
    assert!(matches!(err, EngineError::Io { .. }));
  }

  #[test]
  fn garbage_cells_are_schema_errors() {
    let file = write_csv("Date,Close\n2020-01,abc\n");
    assert!(matches!(
      read_price_csv(file.path(), "X").unwrap_err(),
      EngineError::Schema { .. }
    ));
  }
}
