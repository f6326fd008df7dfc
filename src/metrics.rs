//! # Metrics
//!
//! Risk and performance measures over rebased level series.

pub mod drawdown;
pub mod performance;
pub mod rolling;

pub use drawdown::drawdown;
pub use performance::compute_metrics;
pub use performance::MetricsRecord;
pub use rolling::rolling_returns;
pub use rolling::RollingReturns;
