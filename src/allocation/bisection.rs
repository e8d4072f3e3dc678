//! # Recursive Bisection
//!
//! $$
//! \alpha = 1 - \frac{\tilde\sigma^2_{\text{first}}}{\tilde\sigma^2_{\text{first}} + \tilde\sigma^2_{\text{second}}}
//! $$
//!
//! Top-down capital splitting along the quasi-diagonal ordering. Every
//! contiguous range splits positionally in half and the halves share the
//! range's weight by inverse relative cluster variance.

use ndarray::Array1;
use ndarray::Array2;

use crate::error::AllocationError;
use crate::error::AllocationResult;

use super::types::ClusterOrdering;

const VARIANCE_FLOOR: f64 = 1e-15;

/// Allocate weights by recursive bisection of the ordered instrument list.
///
/// Returns one weight per original instrument column, non-negative and
/// summing to 1: every split hands a convex share of the parent range's
/// weight to each half, so no renormalization is needed. Fails with
/// [`AllocationError::DegenerateCluster`] when a sibling pair carries no
/// variance to split on.
pub fn recursive_bisection(
  cov: &Array2<f64>,
  order: &ClusterOrdering,
) -> AllocationResult<Array1<f64>> {
  let n = cov.nrows();
  debug_assert_eq!(order.len(), n);

  let mut weights = Array1::ones(n);
  let mut generation: Vec<&[usize]> = vec![order.as_slice()];

  while !generation.is_empty() {
    let mut next: Vec<&[usize]> = Vec::with_capacity(generation.len() * 2);
    for range in generation {
      if range.len() > 1 {
        let mid = range.len() / 2;
        next.push(&range[..mid]);
        next.push(&range[mid..]);
      }
    }

    for pair in next.chunks(2) {
      let first = pair[0];
      let second = pair[1];

      let var_first = cluster_variance(cov, first)?;
      let var_second = cluster_variance(cov, second)?;
      let denom = var_first + var_second;
      if denom <= VARIANCE_FLOOR {
        return Err(AllocationError::DegenerateCluster(format!(
          "sibling ranges {first:?} and {second:?} carry no variance"
        )));
      }

      let alpha = 1.0 - var_first / denom;
      for &i in first {
        weights[i] *= alpha;
      }
      for &i in second {
        weights[i] *= 1.0 - alpha;
      }
    }

    generation = next;
  }

  Ok(weights)
}

/// Inverse-variance weights within one ordered range.
///
/// Off-diagonal covariance is deliberately ignored here; this is the IVP
/// simplification intrinsic to HRP.
fn inverse_variance_weights(cov: &Array2<f64>, range: &[usize]) -> AllocationResult<Array1<f64>> {
  let mut inv = Array1::zeros(range.len());
  for (k, &i) in range.iter().enumerate() {
    let v = cov[[i, i]];
    if !v.is_finite() || v <= VARIANCE_FLOOR {
      return Err(AllocationError::DegenerateCluster(format!(
        "instrument column {i} has non-positive variance {v:e}"
      )));
    }
    inv[k] = 1.0 / v;
  }

  let total = inv.sum();
  Ok(inv / total)
}

/// Variance of a range's inverse-variance portfolio, floored at 0.
fn cluster_variance(cov: &Array2<f64>, range: &[usize]) -> AllocationResult<f64> {
  let w = inverse_variance_weights(cov, range)?;

  let mut var = 0.0;
  for (a, &i) in range.iter().enumerate() {
    for (b, &j) in range.iter().enumerate() {
      var += w[a] * cov[[i, j]] * w[b];
    }
  }

  Ok(var.max(0.0))
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use ndarray::array;
  use ndarray_rand::RandomExt;
  use rand::SeedableRng;
  use rand::rngs::StdRng;
  use rand_distr::StandardNormal;

  fn identity_order(n: usize) -> ClusterOrdering {
    ClusterOrdering::new((0..n).collect())
  }

  #[test]
  fn two_uncorrelated_instruments_split_by_inverse_variance() {
    let cov = array![[1.0, 0.0], [0.0, 4.0]];

    let w = recursive_bisection(&cov, &identity_order(2)).unwrap();

    assert_relative_eq!(w[0], 0.8, epsilon = 1e-12);
    assert_relative_eq!(w[1], 0.2, epsilon = 1e-12);
  }

  #[test]
  fn equal_variance_uncorrelated_instruments_get_equal_weights() {
    let n = 5;
    let cov = Array2::from_diag(&Array1::from_elem(n, 2.0));

    let w = recursive_bisection(&cov, &identity_order(n)).unwrap();

    for i in 0..n {
      assert_relative_eq!(w[i], 0.2, epsilon = 1e-12);
    }
  }

  #[test]
  fn weights_respect_the_supplied_ordering() {
    let cov = array![[1.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 1.0]];
    // ordering [1, 0, 2]: first = [1], second = [0, 2]
    let w = recursive_bisection(&cov, &ClusterOrdering::new(vec![1, 0, 2])).unwrap();

    // var(first) = 4, var(second) = ivp(1,1) quadratic form = 0.5
    let alpha = 1.0 - 4.0 / 4.5;
    assert_relative_eq!(w[1], alpha, epsilon = 1e-12);
    assert_relative_eq!(w[0], (1.0 - alpha) / 2.0, epsilon = 1e-12);
    assert_relative_eq!(w[2], (1.0 - alpha) / 2.0, epsilon = 1e-12);
  }

  #[test]
  fn weights_sum_to_one_and_stay_non_negative() {
    let mut rng = StdRng::seed_from_u64(17);
    let samples: Array2<f64> = Array2::random_using((24, 7), StandardNormal, &mut rng);
    // PSD by construction, strictly positive diagonal
    let cov = samples.t().dot(&samples) / 23.0;

    let w = recursive_bisection(&cov, &identity_order(7)).unwrap();

    assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-9);
    for &wi in w.iter() {
      assert!(wi >= 0.0);
    }
  }

  #[test]
  fn hedged_siblings_are_degenerate() {
    // columns 0/1 and 2/3 are perfect hedges: both halves have zero
    // portfolio variance at the first split
    let cov = array![
      [1.0, -1.0, 0.0, 0.0],
      [-1.0, 1.0, 0.0, 0.0],
      [0.0, 0.0, 1.0, -1.0],
      [0.0, 0.0, -1.0, 1.0]
    ];

    let err = recursive_bisection(&cov, &identity_order(4)).unwrap_err();
    assert!(matches!(err, AllocationError::DegenerateCluster(_)));
  }

  #[test]
  fn zero_diagonal_is_degenerate() {
    let cov = array![[0.0, 0.0], [0.0, 4.0]];

    let err = recursive_bisection(&cov, &identity_order(2)).unwrap_err();
    assert!(matches!(err, AllocationError::DegenerateCluster(_)));
  }

  #[test]
  fn odd_range_gives_smaller_first_half() {
    let cov = Array2::from_diag(&array![1.0, 1.0, 1.0]);

    let w = recursive_bisection(&cov, &identity_order(3)).unwrap();

    // first split is [0] vs [1, 2]; equal variances still end 1/3 each
    for i in 0..3 {
      assert_relative_eq!(w[i], 1.0 / 3.0, epsilon = 1e-12);
    }
  }
}
