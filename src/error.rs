//! # Error
//!
//! Typed failure taxonomy shared by every analytics component.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures reported by the analytics engine.
///
/// Every variant carries enough context for a caller to render a message
/// without re-deriving the input shapes.
#[derive(Debug, Error)]
pub enum EngineError {
  /// No usable data after reading, joining or filtering the inputs.
  #[error("no usable data: {context}")]
  EmptyInput { context: String },

  /// Weight count does not match the instrument count it is applied to.
  #[error("dimension mismatch: {expected} instruments but {actual} weights")]
  DimensionMismatch { expected: usize, actual: usize },

  /// The frontier sampler needs a covariance matrix, hence two instruments.
  #[error("efficient frontier needs at least 2 instruments, got {available}")]
  InsufficientAssets { available: usize },

  /// The regression sample after date alignment is too small to fit.
  #[error("regression sample too small: {observations} observations, need at least {required}")]
  InsufficientOverlap { observations: usize, required: usize },

  /// A reference table is missing columns or holds unparseable cells.
  #[error("malformed table `{table}`: {message}")]
  Schema { table: String, message: String },

  /// A weight vector violated its construction invariants.
  #[error("invalid weight vector: {message}")]
  InvalidWeights { message: String },

  /// A reference table could not be read from disk.
  #[error("failed to read `{path}`")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

impl EngineError {
  /// Create an empty-input error.
  pub fn empty_input(context: impl Into<String>) -> Self {
    Self::EmptyInput {
      context: context.into(),
    }
  }

  /// Create a schema error for the named table.
  pub fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Schema {
      table: table.into(),
      message: message.into(),
    }
  }

  /// Create an invalid-weights error.
  pub fn invalid_weights(message: impl Into<String>) -> Self {
    Self::InvalidWeights {
      message: message.into(),
    }
  }
}
