//! # Allocation
//!
//! $$
//! \mathbf{w} = \operatorname{HRP}(\Sigma, \rho)
//! $$
//!
//! Hierarchical Risk Parity pipeline: return alignment, covariance and
//! correlation estimation, correlation distance, single-linkage clustering,
//! quasi-diagonalization and recursive bisection.

pub mod bisection;
pub mod data;
pub mod distance;
pub mod engine;
pub mod estimator;
pub mod linkage;
pub mod ordering;
pub mod types;

pub use bisection::recursive_bisection;
pub use data::align_returns;
pub use data::monthly_returns;
pub use distance::correlation_distance;
pub use engine::HrpAllocation;
pub use engine::HrpEngine;
pub use engine::HrpEngineConfig;
pub use estimator::estimate_covariance;
pub use linkage::single_linkage;
pub use ordering::quasi_diagonal_order;
pub use ordering::seriate;
pub use types::ClusterOrdering;
pub use types::CovarianceEstimate;
pub use types::LinkageStep;
pub use types::LinkageTree;
pub use types::ReturnMatrix;
pub use types::ReturnSeries;
pub use types::WeightVector;
