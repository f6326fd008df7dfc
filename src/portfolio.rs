//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Weighted portfolio aggregation and Monte Carlo frontier sampling.

pub mod aggregator;
pub mod frontier;
pub mod types;

pub use aggregator::build_portfolio;
pub use aggregator::correlation;
pub use frontier::sample_frontier;
pub use frontier::FrontierConfig;
pub use types::FrontierPoint;
pub use types::FrontierResult;
pub use types::NamedPortfolio;
pub use types::PortfolioLabel;
pub use types::PortfolioSeries;
pub use types::Weights;
pub use types::WEIGHT_SUM_TOLERANCE;
