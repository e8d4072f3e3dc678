//! # Return Data
//!
//! $$
//! r_t = \frac{p_t - p_{t-1}}{p_{t-1}}
//! $$
//!
//! Monthly return derivation from open-price history and alignment of many
//! return series onto their common period index.

use std::collections::BTreeSet;
use std::collections::HashMap;

use chrono::Datelike;
use chrono::NaiveDate;
use ndarray::Array2;
use tracing::warn;

use crate::error::AllocationError;
use crate::error::AllocationResult;
use crate::provider::PricePoint;

use super::types::ReturnMatrix;
use super::types::ReturnSeries;

/// Derive a monthly [`ReturnSeries`] from a dated open-price history.
///
/// Keeps observations dated on the first calendar day of a month with a
/// finite, strictly positive open, sorts them chronologically, and computes
/// the simple return between consecutive kept opens. Each return is labelled
/// with the later observation's date. Fails with
/// [`AllocationError::InsufficientData`] when fewer than two usable monthly
/// observations exist; callers treat that as an exclusion, not a fatal error.
pub fn monthly_returns(symbol: &str, history: &[PricePoint]) -> AllocationResult<ReturnSeries> {
  let mut monthly: Vec<&PricePoint> = history
    .iter()
    .filter(|p| p.date.day() == 1 && p.open.is_finite() && p.open > 0.0)
    .collect();
  monthly.sort_by_key(|p| p.date);
  monthly.dedup_by_key(|p| p.date);

  if monthly.len() < 2 {
    return Err(AllocationError::InsufficientData(format!(
      "{symbol}: {} monthly observations, need at least 2",
      monthly.len()
    )));
  }

  let mut periods = Vec::with_capacity(monthly.len() - 1);
  let mut values = Vec::with_capacity(monthly.len() - 1);
  for pair in monthly.windows(2) {
    let prev = pair[0];
    let curr = pair[1];
    periods.push(curr.date);
    values.push((curr.open - prev.open) / prev.open);
  }

  Ok(ReturnSeries::new(symbol.to_string(), periods, values))
}

/// Align return series onto their common period index.
///
/// An instrument holding fewer than `min_periods` finite observations is
/// excluded up front so one sparse series cannot collapse the intersection;
/// each exclusion is logged. Fails with
/// [`AllocationError::InsufficientData`] when fewer than two instruments
/// survive or the intersected index is shorter than `min_periods`.
/// `min_periods` below 2 is treated as 2.
pub fn align_returns(
  series: &[ReturnSeries],
  min_periods: usize,
) -> AllocationResult<ReturnMatrix> {
  let min_periods = min_periods.max(2);

  let mut usable: Vec<(&ReturnSeries, HashMap<NaiveDate, f64>)> = Vec::with_capacity(series.len());
  for s in series {
    let by_date: HashMap<NaiveDate, f64> = s
      .periods
      .iter()
      .zip(s.values.iter())
      .filter(|(_, v)| v.is_finite())
      .map(|(d, v)| (*d, *v))
      .collect();

    if by_date.len() < min_periods {
      warn!(
        symbol = %s.symbol,
        periods = by_date.len(),
        "excluding instrument with too few usable periods"
      );
      continue;
    }
    usable.push((s, by_date));
  }

  if usable.len() < 2 {
    return Err(AllocationError::InsufficientData(format!(
      "{} instruments with usable history, need at least 2",
      usable.len()
    )));
  }

  let mut common: BTreeSet<NaiveDate> = usable[0].1.keys().copied().collect();
  for (_, by_date) in &usable[1..] {
    common.retain(|date| by_date.contains_key(date));
  }

  if common.len() < min_periods {
    return Err(AllocationError::InsufficientData(format!(
      "{} common periods across {} instruments, need at least {min_periods}",
      common.len(),
      usable.len()
    )));
  }

  let index: Vec<NaiveDate> = common.into_iter().collect();
  let symbols: Vec<String> = usable.iter().map(|(s, _)| s.symbol.clone()).collect();
  let mut values = Array2::zeros((index.len(), symbols.len()));
  for (col, (_, by_date)) in usable.iter().enumerate() {
    for (row, date) in index.iter().enumerate() {
      values[[row, col]] = by_date[date];
    }
  }

  ReturnMatrix::from_aligned(symbols, index, values)
}
