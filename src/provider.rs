//! # Price History Providers
//!
//! Boundary for fetching dated opening prices per instrument. The pipeline
//! only needs the [`PriceHistory`] trait; implementations decide transport.
//! Provider failures are per-instrument signals the caller absorbs as
//! exclusions.

use std::collections::HashMap;

use chrono::NaiveDate;
use impl_new_derive::ImplNew;
use thiserror::Error;

#[cfg(feature = "fmp")]
pub mod fmp;

/// One dated opening-price observation.
#[derive(Clone, Copy, Debug, PartialEq, ImplNew)]
pub struct PricePoint {
  /// Observation date.
  pub date: NaiveDate,
  /// Opening price on that date.
  pub open: f64,
}

/// Failures a provider can signal for one instrument.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
  /// The provider holds no history for the requested symbol.
  #[error("no price history available for {0}")]
  Unavailable(String),
  /// Transport-level failure fetching the history.
  #[error("transport failure for {0}: {1}")]
  Transport(String, String),
  /// The provider responded with an undecodable payload.
  #[error("malformed history for {0}: {1}")]
  Malformed(String, String),
}

/// Source of dated opening prices, one series per instrument.
pub trait PriceHistory {
  /// Fetch the chronological open-price history for `symbol`.
  fn history(&self, symbol: &str) -> Result<Vec<PricePoint>, ProviderError>;
}

/// Fixed in-memory provider for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProvider {
  histories: HashMap<String, Vec<PricePoint>>,
}

impl InMemoryProvider {
  /// Build from (symbol, history) pairs.
  pub fn new(entries: Vec<(String, Vec<PricePoint>)>) -> Self {
    Self {
      histories: entries.into_iter().collect(),
    }
  }

  /// Insert or replace one symbol's history.
  pub fn insert(&mut self, symbol: impl Into<String>, points: Vec<PricePoint>) {
    self.histories.insert(symbol.into(), points);
  }
}

impl PriceHistory for InMemoryProvider {
  fn history(&self, symbol: &str) -> Result<Vec<PricePoint>, ProviderError> {
    let mut points = self
      .histories
      .get(symbol)
      .cloned()
      .ok_or_else(|| ProviderError::Unavailable(symbol.to_string()))?;
    points.sort_by_key(|p| p.date);
    Ok(points)
  }
}
