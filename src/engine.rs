//! # Engine
//!
//! Facade wiring the components together behind one configuration object.
//! Static reference tables (factors, category mappings) are injected once
//! at construction and never mutated, so a single engine value can serve
//! concurrent callers.

use crate::allocation::rollup;
use crate::allocation::AllocationTable;
use crate::allocation::MappingTable;
use crate::error::Result;
use crate::factors::factor_exposure;
use crate::factors::FactorExposure;
use crate::factors::FactorTable;
use crate::metrics::compute_metrics;
use crate::metrics::MetricsRecord;
use crate::portfolio::build_portfolio;
use crate::portfolio::correlation;
use crate::portfolio::sample_frontier;
use crate::portfolio::FrontierConfig;
use crate::portfolio::FrontierResult;
use crate::portfolio::PortfolioSeries;
use crate::portfolio::Weights;
use crate::series::align;
use crate::series::AlignedTable;
use crate::series::AlignmentNote;
use crate::series::DateWindow;
use crate::series::PriceSeries;
use crate::series::Series;

/// Runtime configuration for [`AnalyticsEngine`].
#[derive(Clone, Debug)]
pub struct EngineConfig {
  /// Rolling-return window lengths, in periods.
  pub rolling_windows: Vec<usize>,
  /// Number of frontier samples to draw.
  pub frontier_samples: usize,
  /// Risk-free rate for Sharpe numerators.
  pub risk_free: f64,
  /// Display floor for frontier pie weights.
  pub weight_floor: f64,
  /// Seed for the frontier sampler. `None` draws from thread entropy.
  pub frontier_seed: Option<u64>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      rolling_windows: vec![36, 60, 120],
      frontier_samples: 5000,
      risk_free: 0.0,
      weight_floor: 0.05,
      frontier_seed: None,
    }
  }
}

/// Read-only reference tables loaded once at process start.
#[derive(Clone, Debug)]
pub struct ReferenceData {
  /// Monthly factor returns.
  pub factors: FactorTable,
  /// Instrument-to-country mapping.
  pub country: MappingTable,
  /// Instrument-to-sector mapping.
  pub sector: MappingTable,
}

/// Everything the caller renders for one portfolio request.
#[derive(Clone, Debug)]
pub struct AnalyticsReport {
  /// Which instrument constrained the usable history, and from when.
  pub note: AlignmentNote,
  /// Index, returns and optional benchmark over the requested window.
  pub portfolio: PortfolioSeries,
  pub portfolio_metrics: MetricsRecord,
  /// Present only when a benchmark was supplied.
  pub benchmark_metrics: Option<MetricsRecord>,
  pub portfolio_exposure: FactorExposure,
  /// Present only when a benchmark was supplied.
  pub benchmark_exposure: Option<FactorExposure>,
  /// Present only for multi-instrument portfolios.
  pub frontier: Option<FrontierResult>,
  /// Present only for multi-instrument portfolios.
  pub correlation: Option<Vec<Vec<f64>>>,
  pub country_allocation: AllocationTable,
  pub sector_allocation: AllocationTable,
}

/// Single entry point for portfolio analytics.
#[derive(Clone, Debug)]
pub struct AnalyticsEngine {
  config: EngineConfig,
  reference: ReferenceData,
}

impl AnalyticsEngine {
  /// Construct an engine with explicit configuration and reference data.
  pub fn new(config: EngineConfig, reference: ReferenceData) -> Self {
    Self { config, reference }
  }

  /// Borrow the engine configuration.
  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Borrow the injected reference data.
  pub fn reference(&self) -> &ReferenceData {
    &self.reference
  }

  /// Align raw price series onto their shared calendar.
  pub fn align(&self, series: &[PriceSeries]) -> Result<(AlignedTable, AlignmentNote)> {
    align(series)
  }

  /// Build the weighted portfolio series.
  pub fn build_portfolio(
    &self,
    table: &AlignedTable,
    weights: &Weights,
    benchmark: Option<&Series>,
    window: Option<&DateWindow>,
  ) -> Result<PortfolioSeries> {
    build_portfolio(table, weights, benchmark, window)
  }

  /// Sample the efficient-frontier cloud for an aligned table.
  pub fn frontier(&self, table: &AlignedTable) -> Result<FrontierResult> {
    sample_frontier(table, &self.frontier_config())
  }

  /// Metrics record for one level series, using the configured windows.
  pub fn metrics(&self, series: &Series) -> Result<MetricsRecord> {
    compute_metrics(series, &self.config.rolling_windows)
  }

  /// Factor exposure of one level series against the reference factors.
  pub fn factor_exposure(&self, series: &Series) -> Result<FactorExposure> {
    factor_exposure(series, &self.reference.factors)
  }

  /// Country breakdown for the given instruments and weights.
  pub fn country_allocation(
    &self,
    instruments: &[String],
    weights: &Weights,
  ) -> Result<AllocationTable> {
    rollup(&self.reference.country, instruments, weights)
  }

  /// Sector breakdown for the given instruments and weights.
  pub fn sector_allocation(
    &self,
    instruments: &[String],
    weights: &Weights,
  ) -> Result<AllocationTable> {
    rollup(&self.reference.sector, instruments, weights)
  }

  /// Run the whole pipeline for one request.
  ///
  /// Benchmark-dependent outputs are omitted when no benchmark is given;
  /// frontier and correlation are omitted for single-instrument
  /// portfolios, which have no risk/return trade-off to sample.
  pub fn analyze(
    &self,
    series: &[PriceSeries],
    weights: &Weights,
    benchmark: Option<&Series>,
    window: Option<&DateWindow>,
  ) -> Result<AnalyticsReport> {
    let (table, note) = align(series)?;
    let portfolio = build_portfolio(&table, weights, benchmark, window)?;

    let windowed = match window {
      Some(w) => table.window(w)?,
      None => table.clone(),
    };

    let (frontier, correlation_matrix) = if windowed.n_instruments() >= 2 {
      (
        Some(sample_frontier(&windowed, &self.frontier_config())?),
        Some(correlation(&windowed)),
      )
    } else {
      tracing::debug!("single-instrument portfolio, skipping frontier and correlation");
      (None, None)
    };

    let portfolio_metrics = compute_metrics(&portfolio.index, &self.config.rolling_windows)?;
    let benchmark_metrics = portfolio
      .benchmark
      .as_ref()
      .map(|b| compute_metrics(b, &self.config.rolling_windows))
      .transpose()?;

    let portfolio_exposure = factor_exposure(&portfolio.index, &self.reference.factors)?;
    let benchmark_exposure = portfolio
      .benchmark
      .as_ref()
      .map(|b| factor_exposure(b, &self.reference.factors))
      .transpose()?;

    let country_allocation = rollup(&self.reference.country, table.symbols(), weights)?;
    let sector_allocation = rollup(&self.reference.sector, table.symbols(), weights)?;

    Ok(AnalyticsReport {
      note,
      portfolio,
      portfolio_metrics,
      benchmark_metrics,
      portfolio_exposure,
      benchmark_exposure,
      frontier,
      correlation: correlation_matrix,
      country_allocation,
      sector_allocation,
    })
  }

  fn frontier_config(&self) -> FrontierConfig {
    FrontierConfig {
      samples: self.config.frontier_samples,
      risk_free: self.config.risk_free,
      weight_floor: self.config.weight_floor,
      seed: self.config.frontier_seed,
    }
  }
}
