//! # Factors
//!
//! Fixed factor reference table and the excess-return exposure regression.

pub mod regression;
pub mod table;

pub use regression::factor_exposure;
pub use regression::FactorExposure;
pub use table::FactorTable;
pub use table::FACTOR_NAMES;
pub use table::RISK_FREE_NAME;
