//! # FinancialModelingPrep Provider
//!
//! Blocking REST client for the FMP historical-price endpoint, enabled by
//! the `fmp` cargo feature. The API key is passed explicitly through
//! [`FmpConfig`]; the library never reads it from the environment.

use chrono::NaiveDate;
use serde::Deserialize;

use super::PriceHistory;
use super::PricePoint;
use super::ProviderError;

const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com";

/// Configuration for [`FmpProvider`].
#[derive(Clone, Debug)]
pub struct FmpConfig {
  /// API key sent as the `apikey` query parameter.
  pub api_key: String,
  /// API origin, overridable for tests.
  pub base_url: String,
}

impl FmpConfig {
  /// Config against the public FMP origin.
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key: api_key.into(),
      base_url: DEFAULT_BASE_URL.to_string(),
    }
  }
}

/// [`PriceHistory`] implementation backed by the FMP REST API.
#[derive(Debug)]
pub struct FmpProvider {
  config: FmpConfig,
  client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct HistoricalResponse {
  #[serde(default)]
  historical: Vec<HistoricalBar>,
}

#[derive(Debug, Deserialize)]
struct HistoricalBar {
  date: String,
  open: f64,
}

impl FmpProvider {
  /// Build a provider with its own connection pool.
  pub fn new(config: FmpConfig) -> Self {
    Self {
      config,
      client: reqwest::blocking::Client::new(),
    }
  }

  /// Borrow provider configuration.
  pub fn config(&self) -> &FmpConfig {
    &self.config
  }
}

impl PriceHistory for FmpProvider {
  fn history(&self, symbol: &str) -> Result<Vec<PricePoint>, ProviderError> {
    let url = format!(
      "{}/api/v3/historical-price-full/{symbol}",
      self.config.base_url
    );
    let body = self
      .client
      .get(&url)
      .query(&[("apikey", self.config.api_key.as_str())])
      .send()
      .and_then(|response| response.error_for_status())
      .and_then(|response| response.text())
      .map_err(|e| ProviderError::Transport(symbol.to_string(), e.to_string()))?;

    parse_history(symbol, &body)
  }
}

/// Decode an FMP historical-price payload into chronological price points.
fn parse_history(symbol: &str, body: &str) -> Result<Vec<PricePoint>, ProviderError> {
  let payload: HistoricalResponse = serde_json::from_str(body)
    .map_err(|e| ProviderError::Malformed(symbol.to_string(), e.to_string()))?;

  if payload.historical.is_empty() {
    return Err(ProviderError::Unavailable(symbol.to_string()));
  }

  let mut points = Vec::with_capacity(payload.historical.len());
  for bar in payload.historical {
    let date = NaiveDate::parse_from_str(&bar.date, "%Y-%m-%d")
      .map_err(|e| ProviderError::Malformed(symbol.to_string(), e.to_string()))?;
    points.push(PricePoint::new(date, bar.open));
  }

  // the API lists bars newest first
  points.sort_by_key(|p| p.date);
  Ok(points)
}
