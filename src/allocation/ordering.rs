//! # Quasi-Diagonalization
//!
//! Pre-order leaf expansion of the dendrogram. Instruments that merged at
//! small distances land adjacently, pushing covariance mass toward the
//! diagonal of the reordered matrix.

use ndarray::Array2;

use crate::error::AllocationError;
use crate::error::AllocationResult;

use super::types::ClusterOrdering;
use super::types::LinkageTree;

/// Expand a linkage tree into its quasi-diagonal leaf ordering.
///
/// Walks the tree depth-first from the final merge, left child before
/// right, emitting instrument ids at the leaves. The result is validated as
/// a permutation of `0..n`; any forward-referencing child id, out-of-range
/// id, duplicate, or omission is [`AllocationError::TreeCorruption`].
pub fn quasi_diagonal_order(tree: &LinkageTree) -> AllocationResult<ClusterOrdering> {
  let n = tree.n_leaves();
  if tree.steps().len() + 1 != n {
    return Err(AllocationError::TreeCorruption(format!(
      "{} merge steps cannot cover {n} leaves",
      tree.steps().len()
    )));
  }

  let mut order = Vec::with_capacity(n);
  expand(tree, tree.root_id(), &mut order)?;

  if order.len() != n {
    return Err(AllocationError::TreeCorruption(format!(
      "expansion yielded {} leaves, expected {n}",
      order.len()
    )));
  }
  let mut seen = vec![false; n];
  for &leaf in &order {
    if seen[leaf] {
      return Err(AllocationError::TreeCorruption(format!(
        "leaf {leaf} expanded twice"
      )));
    }
    seen[leaf] = true;
  }

  Ok(ClusterOrdering::new(order))
}

fn expand(tree: &LinkageTree, id: usize, out: &mut Vec<usize>) -> AllocationResult<()> {
  let n = tree.n_leaves();
  if id < n {
    out.push(id);
    return Ok(());
  }

  let step = tree
    .steps()
    .get(id - n)
    .ok_or_else(|| AllocationError::TreeCorruption(format!("cluster id {id} out of range")))?;
  // children must predate their parent, otherwise expansion cannot terminate
  if step.left >= id || step.right >= id {
    return Err(AllocationError::TreeCorruption(format!(
      "step {} references a non-earlier child",
      id - n
    )));
  }

  expand(tree, step.left, out)?;
  expand(tree, step.right, out)
}

/// Reorder a square matrix's rows and columns by a cluster ordering.
pub fn seriate(matrix: &Array2<f64>, order: &ClusterOrdering) -> Array2<f64> {
  let idx = order.as_slice();
  Array2::from_shape_fn((idx.len(), idx.len()), |(i, j)| matrix[[idx[i], idx[j]]])
}
