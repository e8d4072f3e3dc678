//! # Allocation Types
//!
//! $$
//! d_{ij} = \sqrt{\tfrac{1}{2}(1-\rho_{ij})}
//! $$
//!
//! Shared data carriers for the HRP allocation pipeline.

use chrono::NaiveDate;
use impl_new_derive::ImplNew;
use ndarray::Array2;

use crate::error::AllocationError;
use crate::error::AllocationResult;

/// Per-instrument return series labelled by period date.
#[derive(Clone, Debug, ImplNew)]
pub struct ReturnSeries {
  /// Instrument identifier.
  pub symbol: String,
  /// Chronologically ordered period labels, one per value.
  pub periods: Vec<NaiveDate>,
  /// Simple returns, one per period label.
  pub values: Vec<f64>,
}

impl ReturnSeries {
  /// Number of periods carried by the series.
  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

/// Aligned returns over a common period index, one column per instrument.
#[derive(Clone, Debug)]
pub struct ReturnMatrix {
  symbols: Vec<String>,
  index: Vec<NaiveDate>,
  values: Array2<f64>,
}

impl ReturnMatrix {
  /// Build from pre-aligned parts, validating the shape invariants.
  pub fn from_aligned(
    symbols: Vec<String>,
    index: Vec<NaiveDate>,
    values: Array2<f64>,
  ) -> AllocationResult<Self> {
    if symbols.is_empty() {
      return Err(AllocationError::InsufficientData(
        "no instruments in aligned batch".to_string(),
      ));
    }
    if index.len() < 2 {
      return Err(AllocationError::InsufficientData(format!(
        "{} common periods, need at least 2",
        index.len()
      )));
    }
    if values.nrows() != index.len() || values.ncols() != symbols.len() {
      return Err(AllocationError::DegenerateInput(format!(
        "value shape {:?} does not match {} periods x {} instruments",
        values.dim(),
        index.len(),
        symbols.len()
      )));
    }

    Ok(Self {
      symbols,
      index,
      values,
    })
  }

  /// Retained instrument identifiers, in column order.
  pub fn symbols(&self) -> &[String] {
    &self.symbols
  }

  /// Common period index, ascending.
  pub fn index(&self) -> &[NaiveDate] {
    &self.index
  }

  /// Aligned values, shape (periods, instruments).
  pub fn values(&self) -> &Array2<f64> {
    &self.values
  }

  pub fn n_instruments(&self) -> usize {
    self.values.ncols()
  }

  pub fn n_periods(&self) -> usize {
    self.values.nrows()
  }
}

/// Covariance and correlation estimates over a retained instrument set.
#[derive(Clone, Debug)]
pub struct CovarianceEstimate {
  symbols: Vec<String>,
  covariance: Array2<f64>,
  correlation: Array2<f64>,
}

impl CovarianceEstimate {
  pub(crate) fn new(
    symbols: Vec<String>,
    covariance: Array2<f64>,
    correlation: Array2<f64>,
  ) -> Self {
    Self {
      symbols,
      covariance,
      correlation,
    }
  }

  /// Instrument identifiers matching both matrix orderings.
  pub fn symbols(&self) -> &[String] {
    &self.symbols
  }

  /// Unbiased sample covariance, strictly positive diagonal.
  pub fn covariance(&self) -> &Array2<f64> {
    &self.covariance
  }

  /// Pearson correlation with unit diagonal, values in [-1, 1].
  pub fn correlation(&self) -> &Array2<f64> {
    &self.correlation
  }
}

/// One agglomeration record: child cluster ids, merge distance, member count.
#[derive(Clone, Copy, Debug, PartialEq, ImplNew)]
pub struct LinkageStep {
  /// Smaller child cluster id.
  pub left: usize,
  /// Larger child cluster id.
  pub right: usize,
  /// Inter-cluster distance at which the children merged.
  pub distance: f64,
  /// Member count of the merged cluster.
  pub size: usize,
}

/// Single-linkage dendrogram over `n_leaves` instruments.
///
/// Ids `0..n_leaves` denote original instrument columns; step `k` creates
/// cluster id `n_leaves + k`.
#[derive(Clone, Debug)]
pub struct LinkageTree {
  n_leaves: usize,
  steps: Vec<LinkageStep>,
}

impl LinkageTree {
  /// Assemble a tree from merge records.
  pub fn from_steps(n_leaves: usize, steps: Vec<LinkageStep>) -> Self {
    Self { n_leaves, steps }
  }

  pub fn n_leaves(&self) -> usize {
    self.n_leaves
  }

  /// Merge records in creation order.
  pub fn steps(&self) -> &[LinkageStep] {
    &self.steps
  }

  /// Id of the final merged cluster.
  pub fn root_id(&self) -> usize {
    self.n_leaves + self.steps.len() - 1
  }
}

/// Quasi-diagonal leaf ordering, a permutation of instrument columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterOrdering {
  positions: Vec<usize>,
}

impl ClusterOrdering {
  pub(crate) fn new(positions: Vec<usize>) -> Self {
    Self { positions }
  }

  /// Instrument column indices in dendrogram pre-order.
  pub fn as_slice(&self) -> &[usize] {
    &self.positions
  }

  pub fn len(&self) -> usize {
    self.positions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  /// Rearrange `labels` into this ordering; `labels` must cover every index.
  pub fn apply<T: Clone>(&self, labels: &[T]) -> Vec<T> {
    self.positions.iter().map(|&i| labels[i].clone()).collect()
  }
}

/// Final weights keyed by instrument, in quasi-diagonal order.
#[derive(Clone, Debug)]
pub struct WeightVector {
  entries: Vec<(String, f64)>,
}

impl WeightVector {
  pub(crate) fn new(entries: Vec<(String, f64)>) -> Self {
    Self { entries }
  }

  /// Ordered (identifier, weight) pairs.
  pub fn entries(&self) -> &[(String, f64)] {
    &self.entries
  }

  /// Weight of a single instrument, if retained.
  pub fn get(&self, symbol: &str) -> Option<f64> {
    self
      .entries
      .iter()
      .find(|(s, _)| s == symbol)
      .map(|(_, w)| *w)
  }

  /// Sum of all weights.
  pub fn total(&self) -> f64 {
    self.entries.iter().map(|(_, w)| w).sum()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
