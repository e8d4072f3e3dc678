//! # hrp-rs
//!
//! $$
//! \mathbf{w} = \operatorname{HRP}(\mathbf{R}), \qquad
//! d_{ij} = \sqrt{\tfrac{1}{2}(1-\rho_{ij})}
//! $$
//!
//! Hierarchical Risk Parity portfolio allocation: monthly returns are
//! aligned onto a common index, covariance and correlation are estimated,
//! the correlation distance drives single-linkage clustering, the
//! dendrogram is quasi-diagonalized and capital is split by recursive
//! bisection. Provider and visualization boundaries wrap the pure pipeline
//! into an end-to-end allocation service.

pub mod allocation;
pub mod error;
pub mod provider;
pub mod service;
pub mod visualization;

pub use error::AllocationError;
pub use error::AllocationResult;
