//! # HRP Engine
//!
//! $$
//! \mathbf{w} = \operatorname{HRP}(\mathbf{R})
//! $$
//!
//! End-to-end pipeline orchestration: alignment, covariance estimation,
//! correlation distance, single-linkage clustering, quasi-diagonalization
//! and recursive bisection.

use ndarray::Array2;
use tracing::debug;

use crate::error::AllocationResult;

use super::bisection::recursive_bisection;
use super::data::align_returns;
use super::distance::correlation_distance;
use super::estimator::estimate_covariance;
use super::linkage::single_linkage;
use super::ordering::quasi_diagonal_order;
use super::ordering::seriate;
use super::types::ClusterOrdering;
use super::types::LinkageTree;
use super::types::ReturnSeries;
use super::types::WeightVector;

/// Runtime configuration for [`HrpEngine`].
#[derive(Clone, Debug)]
pub struct HrpEngineConfig {
  /// Minimum usable periods per instrument and for the aligned index.
  /// Values below 2 are treated as 2.
  pub min_periods: usize,
}

impl Default for HrpEngineConfig {
  fn default() -> Self {
    Self { min_periods: 2 }
  }
}

/// Full output of one allocation run.
#[derive(Clone, Debug)]
pub struct HrpAllocation {
  weights: WeightVector,
  ordering: ClusterOrdering,
  tree: LinkageTree,
  symbols: Vec<String>,
  correlation: Array2<f64>,
  seriated_correlation: Array2<f64>,
}

impl HrpAllocation {
  /// Weights in quasi-diagonal order.
  pub fn weights(&self) -> &WeightVector {
    &self.weights
  }

  /// Leaf ordering derived from the dendrogram.
  pub fn ordering(&self) -> &ClusterOrdering {
    &self.ordering
  }

  /// The single-linkage dendrogram behind the ordering.
  pub fn tree(&self) -> &LinkageTree {
    &self.tree
  }

  /// Retained instrument identifiers in original column order.
  pub fn symbols(&self) -> &[String] {
    &self.symbols
  }

  /// Identifiers rearranged into quasi-diagonal order.
  pub fn ordered_symbols(&self) -> Vec<String> {
    self.ordering.apply(&self.symbols)
  }

  /// Correlation matrix in original column order.
  pub fn correlation(&self) -> &Array2<f64> {
    &self.correlation
  }

  /// Correlation matrix reordered by the cluster ordering.
  pub fn seriated_correlation(&self) -> &Array2<f64> {
    &self.seriated_correlation
  }

  /// Consume the allocation, keeping only the weights.
  pub fn into_weights(self) -> WeightVector {
    self.weights
  }
}

/// Pure in-memory allocation engine.
#[derive(Clone, Debug, Default)]
pub struct HrpEngine {
  config: HrpEngineConfig,
}

impl HrpEngine {
  /// Construct an engine with explicit configuration.
  pub fn new(config: HrpEngineConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &HrpEngineConfig {
    &self.config
  }

  /// Run the allocation pipeline over per-instrument return series.
  ///
  /// Sparse instruments are excluded during alignment; everything after
  /// alignment either completes for the whole batch or fails with no
  /// partial weights.
  pub fn allocate(&self, series: &[ReturnSeries]) -> AllocationResult<HrpAllocation> {
    let aligned = align_returns(series, self.config.min_periods)?;
    debug!(
      instruments = aligned.n_instruments(),
      periods = aligned.n_periods(),
      "aligned return batch"
    );

    let estimate = estimate_covariance(&aligned)?;
    let dist = correlation_distance(estimate.correlation());
    let tree = single_linkage(&dist)?;
    let ordering = quasi_diagonal_order(&tree)?;
    let seriated_correlation = seriate(estimate.correlation(), &ordering);
    let raw_weights = recursive_bisection(estimate.covariance(), &ordering)?;

    let symbols = aligned.symbols().to_vec();
    let entries: Vec<(String, f64)> = ordering
      .as_slice()
      .iter()
      .map(|&i| (symbols[i].clone(), raw_weights[i]))
      .collect();
    debug!(instruments = entries.len(), "allocation complete");

    Ok(HrpAllocation {
      weights: WeightVector::new(entries),
      ordering,
      tree,
      symbols,
      correlation: estimate.correlation().clone(),
      seriated_correlation,
    })
  }
}
