//! # Correlation Distance
//!
//! $$
//! d_{ij} = \sqrt{\tfrac{1-\rho_{ij}}{2}}
//! $$
//!
//! Maps a correlation matrix into the [0, 1] metric the clusterer works on:
//! perfectly correlated instruments sit at distance 0, perfectly
//! anti-correlated ones at distance 1.

use ndarray::Array2;

/// Correlation-to-distance transform with exact zero diagonal.
///
/// The radicand is floored at 0 so correlations rounding above 1.0 cannot
/// produce NaN; symmetry comes from mirroring the upper triangle.
pub fn correlation_distance(correlation: &Array2<f64>) -> Array2<f64> {
  let n = correlation.nrows();
  let mut dist = Array2::zeros((n, n));

  for i in 0..n {
    for j in (i + 1)..n {
      let d = ((1.0 - correlation[[i, j]]).max(0.0) / 2.0).sqrt();
      dist[[i, j]] = d;
      dist[[j, i]] = d;
    }
  }

  dist
}
