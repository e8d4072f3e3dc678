//! # Single-Linkage Clustering
//!
//! $$
//! d(A \cup B,\, C) = \min\{d(A,C),\, d(B,C)\}
//! $$
//!
//! First-principles agglomerative clustering over a correlation distance
//! matrix. The distance between two clusters is the minimum pairwise
//! distance between their members; each merge appends a record in the scipy
//! linkage row layout: child ids, merge distance, member count.

use std::collections::BTreeSet;
use std::collections::HashMap;

use ndarray::Array2;
use ordered_float::OrderedFloat;

use crate::error::AllocationError;
use crate::error::AllocationResult;

use super::types::LinkageStep;
use super::types::LinkageTree;

/// Build a single-linkage dendrogram over `n` instruments.
///
/// `distance` must be square with finite entries. Ids `0..n` are the
/// original instruments; merge `k` creates cluster id `n + k`. Ties at the
/// minimum distance resolve to the lexicographically smallest `(left,
/// right)` id pair, so the merge sequence is reproducible bit for bit.
/// Fails with [`AllocationError::InvalidClusterInput`] when `n < 2`.
pub fn single_linkage(distance: &Array2<f64>) -> AllocationResult<LinkageTree> {
  let n = distance.nrows();
  if n < 2 {
    return Err(AllocationError::InvalidClusterInput(n));
  }

  let mut live: BTreeSet<usize> = (0..n).collect();
  let mut sizes: HashMap<usize, usize> = (0..n).map(|i| (i, 1)).collect();
  let mut dist: HashMap<(usize, usize), f64> = HashMap::with_capacity(n * (n - 1) / 2);
  for i in 0..n {
    for j in (i + 1)..n {
      dist.insert((i, j), distance[[i, j]]);
    }
  }

  let mut steps = Vec::with_capacity(n - 1);
  for step in 0..(n - 1) {
    let ids: Vec<usize> = live.iter().copied().collect();

    // ascending-id scan plus the composite key make the lexicographic
    // tie-break part of the minimum itself
    let mut best = (OrderedFloat(f64::INFINITY), usize::MAX, usize::MAX);
    for (k, &a) in ids.iter().enumerate() {
      for &b in &ids[k + 1..] {
        let key = (OrderedFloat(dist[&(a, b)]), a, b);
        if key < best {
          best = key;
        }
      }
    }
    let (OrderedFloat(merge_distance), a, b) = best;

    let merged = n + step;
    let size = sizes[&a] + sizes[&b];
    steps.push(LinkageStep::new(a, b, merge_distance, size));

    for &c in &ids {
      if c == a || c == b {
        continue;
      }
      let da = dist[&pair_key(a, c)];
      let db = dist[&pair_key(b, c)];
      dist.insert(pair_key(merged, c), da.min(db));
    }

    live.remove(&a);
    live.remove(&b);
    live.insert(merged);
    sizes.insert(merged, size);
  }

  Ok(LinkageTree::from_steps(n, steps))
}

fn pair_key(x: usize, y: usize) -> (usize, usize) {
  if x < y { (x, y) } else { (y, x) }
}
