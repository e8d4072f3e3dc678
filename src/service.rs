//! # Allocation Service
//!
//! Boundary that turns instrument symbols into an allocation report: fetch
//! histories, derive monthly returns, run the engine, render correlation
//! artifacts before and after quasi-diagonalization.

use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use crate::allocation::HrpEngine;
use crate::allocation::HrpEngineConfig;
use crate::allocation::WeightVector;
use crate::allocation::monthly_returns;
use crate::provider::PriceHistory;
use crate::visualization::CorrelationRenderer;

const ORIGINAL_ARTIFACT: &str = "corr_original";
const SERIATED_ARTIFACT: &str = "corr_seriated";

/// Paths of the rendered correlation artifacts.
#[derive(Clone, Debug)]
pub struct CorrelationArtifacts {
  /// Heatmap in original instrument order.
  pub original: PathBuf,
  /// Heatmap in quasi-diagonal order.
  pub seriated: PathBuf,
}

/// Weights plus rendered artifacts for one allocation request.
#[derive(Clone, Debug)]
pub struct AllocationReport {
  /// Weights in quasi-diagonal order, matching the seriated artifact's axes.
  pub weights: WeightVector,
  /// Rendered correlation heatmaps.
  pub artifacts: CorrelationArtifacts,
}

/// End-to-end allocation workflow over a provider and a renderer.
pub struct AllocationService<P, R> {
  provider: P,
  renderer: R,
  engine: HrpEngine,
}

impl<P: PriceHistory, R: CorrelationRenderer> AllocationService<P, R> {
  /// Build a service from its collaborators.
  pub fn new(provider: P, renderer: R, config: HrpEngineConfig) -> Self {
    Self {
      provider,
      renderer,
      engine: HrpEngine::new(config),
    }
  }

  /// Allocate weights for `symbols`, rendering both correlation artifacts.
  ///
  /// Instruments with unavailable or unusable history are excluded and
  /// logged; the request fails only when fewer than two instruments survive
  /// or the estimates degenerate.
  pub fn allocate(&self, symbols: &[String]) -> Result<AllocationReport> {
    let mut series = Vec::with_capacity(symbols.len());
    for symbol in symbols {
      match self.provider.history(symbol) {
        Ok(points) => match monthly_returns(symbol, &points) {
          Ok(s) => series.push(s),
          Err(err) => warn!(%symbol, %err, "excluding instrument"),
        },
        Err(err) => warn!(%symbol, %err, "excluding instrument"),
      }
    }

    let allocation = self.engine.allocate(&series)?;

    let original = self.renderer.render(
      allocation.correlation(),
      allocation.symbols(),
      ORIGINAL_ARTIFACT,
    )?;
    let seriated = self.renderer.render(
      allocation.seriated_correlation(),
      &allocation.ordered_symbols(),
      SERIATED_ARTIFACT,
    )?;

    Ok(AllocationReport {
      weights: allocation.into_weights(),
      artifacts: CorrelationArtifacts { original, seriated },
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use chrono::NaiveDate;
  use tempfile::tempdir;
  use tracing_test::traced_test;

  use crate::error::AllocationError;
  use crate::provider::InMemoryProvider;
  use crate::provider::PricePoint;
  use crate::visualization::HeatmapRenderer;

  fn monthly_history(opens: &[f64]) -> Vec<PricePoint> {
    opens
      .iter()
      .enumerate()
      .map(|(m, &open)| {
        let date = NaiveDate::from_ymd_opt(2023 + (m / 12) as i32, 1 + (m % 12) as u32, 1).unwrap();
        PricePoint::new(date, open)
      })
      .collect()
  }

  fn demo_provider() -> InMemoryProvider {
    let mut provider = InMemoryProvider::default();
    provider.insert(
      "AAA",
      monthly_history(&[100.0, 104.0, 99.0, 103.0, 108.0, 102.0, 107.0]),
    );
    provider.insert(
      "BBB",
      monthly_history(&[50.0, 49.0, 52.0, 54.0, 51.0, 55.0, 53.0]),
    );
    provider.insert(
      "CCC",
      monthly_history(&[20.0, 22.0, 21.0, 20.0, 23.0, 22.0, 24.0]),
    );
    provider
  }

  fn symbols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn report_carries_weights_and_both_artifacts() {
    let dir = tempdir().unwrap();
    let service = AllocationService::new(
      demo_provider(),
      HeatmapRenderer::new(dir.path()),
      HrpEngineConfig::default(),
    );

    let report = service.allocate(&symbols(&["AAA", "BBB", "CCC"])).unwrap();

    assert_eq!(report.weights.len(), 3);
    assert_relative_eq!(report.weights.total(), 1.0, epsilon = 1e-9);
    assert!(report.artifacts.original.exists());
    assert!(report.artifacts.seriated.exists());
  }

  #[test]
  #[traced_test]
  fn unavailable_symbol_is_excluded_not_fatal() {
    let dir = tempdir().unwrap();
    let service = AllocationService::new(
      demo_provider(),
      HeatmapRenderer::new(dir.path()),
      HrpEngineConfig::default(),
    );

    let report = service
      .allocate(&symbols(&["AAA", "MISSING", "BBB", "CCC"]))
      .unwrap();

    assert_eq!(report.weights.len(), 3);
    assert!(report.weights.get("MISSING").is_none());
    assert!(logs_contain("excluding instrument"));
  }

  #[test]
  fn single_survivor_fails_with_insufficient_data() {
    let dir = tempdir().unwrap();
    let mut provider = InMemoryProvider::default();
    provider.insert("AAA", monthly_history(&[100.0, 101.0, 103.0]));
    // one month boundary only, no return can be formed
    provider.insert("SHORT", monthly_history(&[10.0]));

    let service = AllocationService::new(
      provider,
      HeatmapRenderer::new(dir.path()),
      HrpEngineConfig::default(),
    );

    let err = service.allocate(&symbols(&["AAA", "SHORT"])).unwrap_err();
    let allocation_err = err.downcast_ref::<AllocationError>().unwrap();
    assert!(matches!(allocation_err, AllocationError::InsufficientData(_)));
  }

  #[test]
  fn weights_follow_the_seriated_axis_order() {
    let dir = tempdir().unwrap();
    let service = AllocationService::new(
      demo_provider(),
      HeatmapRenderer::new(dir.path()),
      HrpEngineConfig::default(),
    );

    let report = service.allocate(&symbols(&["AAA", "BBB", "CCC"])).unwrap();

    let mut reported: Vec<String> = report
      .weights
      .entries()
      .iter()
      .map(|(s, _)| s.clone())
      .collect();
    reported.sort();
    assert_eq!(reported, symbols(&["AAA", "BBB", "CCC"]));
  }
}
