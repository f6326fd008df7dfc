//! # Quantfolio
//!
//! $$
//! r_{p,t} = \mathbf{w}^\top \mathbf{r}_t,\qquad
//! \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}}
//! $$
//!
//! Portfolio analytics over historical price series: calendar alignment
//! and rebasing, weighted portfolio aggregation with optional benchmark
//! and date window, Monte Carlo efficient-frontier sampling, risk and
//! performance metrics, factor-exposure regression and category
//! allocation rollups.
//!
//! Every computation is a pure function of its inputs plus the read-only
//! reference data injected into [`engine::AnalyticsEngine`] at startup,
//! so independent requests can run concurrently without coordination.

pub mod allocation;
pub mod engine;
pub mod error;
pub mod factors;
pub mod io;
pub mod metrics;
pub mod portfolio;
pub mod series;

pub use allocation::rollup;
pub use allocation::AllocationTable;
pub use allocation::MappingRow;
pub use allocation::MappingTable;
pub use engine::AnalyticsEngine;
pub use engine::AnalyticsReport;
pub use engine::EngineConfig;
pub use engine::ReferenceData;
pub use error::EngineError;
pub use error::Result;
pub use factors::factor_exposure;
pub use factors::FactorExposure;
pub use factors::FactorTable;
pub use metrics::compute_metrics;
pub use metrics::drawdown;
pub use metrics::MetricsRecord;
pub use metrics::RollingReturns;
pub use portfolio::build_portfolio;
pub use portfolio::sample_frontier;
pub use portfolio::FrontierConfig;
pub use portfolio::FrontierResult;
pub use portfolio::PortfolioSeries;
pub use portfolio::Weights;
pub use series::align;
pub use series::AlignedTable;
pub use series::AlignmentNote;
pub use series::DateWindow;
pub use series::PriceSeries;
pub use series::Series;
