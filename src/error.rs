//! # Errors
//!
//! Typed failure taxonomy for the allocation pipeline. Per-instrument
//! problems are absorbed by the caller as exclusions; everything that
//! reaches the caller as an `Err` aborts the whole request.

use thiserror::Error;

/// Failure kinds surfaced by the allocation pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
  /// Too few instruments or periods remain to form an estimable batch.
  #[error("insufficient data: {0}")]
  InsufficientData(String),
  /// Statistically invalid input, e.g. a zero-variance return series.
  #[error("degenerate input: {0}")]
  DegenerateInput(String),
  /// The clusterer needs at least two instruments.
  #[error("cluster input must hold at least 2 instruments, got {0}")]
  InvalidClusterInput(usize),
  /// The dendrogram referenced ids outside its own merge history.
  #[error("linkage tree corruption: {0}")]
  TreeCorruption(String),
  /// A bisection step found no variance to split capital on.
  #[error("degenerate cluster: {0}")]
  DegenerateCluster(String),
}

pub type AllocationResult<T> = std::result::Result<T, AllocationError>;
