//! # Covariance Estimator
//!
//! $$
//! \hat\Sigma_{ij} = \frac{1}{L-1}\sum_{t=1}^{L}(r_{ti}-\bar r_i)(r_{tj}-\bar r_j)
//! $$
//!
//! Unbiased sample covariance and Pearson correlation over aligned returns.

use ndarray::Array2;
use ndarray::Axis;

use crate::error::AllocationError;
use crate::error::AllocationResult;

use super::types::CovarianceEstimate;
use super::types::ReturnMatrix;

const VARIANCE_FLOOR: f64 = 1e-15;

/// Estimate covariance and correlation from an aligned return matrix.
///
/// The upper triangle is computed once and mirrored, so both matrices are
/// exactly symmetric. Fails with [`AllocationError::DegenerateInput`] when
/// any instrument's sample variance is not strictly positive; correlation
/// against such a series is undefined and must not propagate as NaN.
pub fn estimate_covariance(returns: &ReturnMatrix) -> AllocationResult<CovarianceEstimate> {
  let n = returns.n_instruments();
  let l = returns.n_periods();
  let values = returns.values();

  let means = values.sum_axis(Axis(0)) / l as f64;
  let centered = values - &means;

  let mut covariance = Array2::zeros((n, n));
  for i in 0..n {
    for j in i..n {
      let c = centered.column(i).dot(&centered.column(j)) / (l - 1) as f64;
      covariance[[i, j]] = c;
      covariance[[j, i]] = c;
    }
  }

  for (i, symbol) in returns.symbols().iter().enumerate() {
    let v = covariance[[i, i]];
    if !v.is_finite() || v <= VARIANCE_FLOOR {
      return Err(AllocationError::DegenerateInput(format!(
        "{symbol}: sample variance {v:e} is not positive"
      )));
    }
  }

  let mut correlation = Array2::zeros((n, n));
  for i in 0..n {
    correlation[[i, i]] = 1.0;
    for j in (i + 1)..n {
      let denom = (covariance[[i, i]] * covariance[[j, j]]).sqrt();
      let r = (covariance[[i, j]] / denom).clamp(-1.0, 1.0);
      correlation[[i, j]] = r;
      correlation[[j, i]] = r;
    }
  }

  Ok(CovarianceEstimate::new(
    returns.symbols().to_vec(),
    covariance,
    correlation,
  ))
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use chrono::NaiveDate;
  use ndarray::array;

  fn matrix(symbols: &[&str], values: Array2<f64>) -> ReturnMatrix {
    let index: Vec<NaiveDate> = (0..values.nrows())
      .map(|m| NaiveDate::from_ymd_opt(2024, 1 + m as u32, 1).unwrap())
      .collect();
    ReturnMatrix::from_aligned(
      symbols.iter().map(|s| s.to_string()).collect(),
      index,
      values,
    )
    .unwrap()
  }

  #[test]
  fn covariance_matches_hand_computed_values() {
    // X = [1, 0, -1], Y = [2, 0, -2]: var(X) = 1, var(Y) = 4, cov = 2
    let returns = matrix(&["X", "Y"], array![[1.0, 2.0], [0.0, 0.0], [-1.0, -2.0]]);

    let est = estimate_covariance(&returns).unwrap();

    assert_relative_eq!(est.covariance()[[0, 0]], 1.0, epsilon = 1e-12);
    assert_relative_eq!(est.covariance()[[1, 1]], 4.0, epsilon = 1e-12);
    assert_relative_eq!(est.covariance()[[0, 1]], 2.0, epsilon = 1e-12);
    assert_relative_eq!(est.correlation()[[0, 1]], 1.0, epsilon = 1e-12);
  }

  #[test]
  fn correlation_diagonal_is_exactly_one() {
    let returns = matrix(
      &["A", "B", "C"],
      array![
        [0.011, -0.004, 0.021],
        [-0.007, 0.013, -0.002],
        [0.003, 0.009, 0.014],
        [-0.012, -0.006, -0.01]
      ],
    );

    let est = estimate_covariance(&returns).unwrap();

    for i in 0..3 {
      assert_eq!(est.correlation()[[i, i]], 1.0);
      for j in 0..3 {
        assert_eq!(est.correlation()[[i, j]], est.correlation()[[j, i]]);
        assert!(est.correlation()[[i, j]].abs() <= 1.0);
      }
    }
  }

  #[test]
  fn zero_variance_instrument_is_degenerate() {
    let returns = matrix(&["A", "FLAT"], array![[0.01, 0.0], [0.02, 0.0], [-0.01, 0.0]]);

    let err = estimate_covariance(&returns).unwrap_err();

    match err {
      AllocationError::DegenerateInput(msg) => assert!(msg.contains("FLAT")),
      other => panic!("expected DegenerateInput, got {other:?}"),
    }
  }

  #[test]
  fn anti_correlated_pair_clamps_to_bounds() {
    let returns = matrix(&["X", "Y"], array![[0.02, -0.02], [-0.01, 0.01], [0.03, -0.03]]);

    let est = estimate_covariance(&returns).unwrap();

    assert_relative_eq!(est.correlation()[[0, 1]], -1.0, epsilon = 1e-12);
    assert!(est.correlation()[[0, 1]] >= -1.0);
  }
}
