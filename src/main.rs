use anyhow::Result;
use chrono::NaiveDate;
use hrp_rs::allocation::HrpEngineConfig;
use hrp_rs::provider::InMemoryProvider;
use hrp_rs::provider::PricePoint;
use hrp_rs::service::AllocationService;
use hrp_rs::visualization::HeatmapRenderer;
use prettytable::Table;
use prettytable::row;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use rand_distr::Normal;

fn month_start(index: usize) -> NaiveDate {
  let year = 2019 + (index / 12) as i32;
  let month = 1 + (index % 12) as u32;
  NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

fn synthetic_history(
  rng: &mut StdRng,
  months: usize,
  drift: f64,
  vol: f64,
) -> Result<Vec<PricePoint>> {
  let step = Normal::new(drift, vol)?;
  let mut price = 100.0;
  let mut points = Vec::with_capacity(months);
  for m in 0..months {
    points.push(PricePoint::new(month_start(m), price));
    price *= 1.0 + step.sample(rng);
  }
  Ok(points)
}

fn main() -> Result<()> {
  let universe = [
    ("BLUE", 0.006, 0.035),
    ("CORE", 0.004, 0.02),
    ("EDGE", 0.01, 0.08),
    ("GRID", 0.005, 0.03),
    ("MINT", 0.002, 0.015),
    ("WAVE", 0.008, 0.06),
  ];

  let mut rng = StdRng::seed_from_u64(42);
  let mut provider = InMemoryProvider::default();
  for &(symbol, drift, vol) in &universe {
    provider.insert(symbol, synthetic_history(&mut rng, 36, drift, vol)?);
  }

  let renderer = HeatmapRenderer::new("target/hrp-artifacts").title("HRP demo");
  let service = AllocationService::new(provider, renderer, HrpEngineConfig::default());

  let symbols: Vec<String> = universe.iter().map(|(s, _, _)| s.to_string()).collect();
  let report = service.allocate(&symbols)?;

  let mut table = Table::new();
  table.add_row(row!["symbol", "weight"]);
  for (symbol, weight) in report.weights.entries() {
    table.add_row(row![symbol, format!("{weight:.4}")]);
  }
  table.printstd();

  println!(
    "artifacts: {} and {}",
    report.artifacts.original.display(),
    report.artifacts.seriated.display()
  );

  Ok(())
}
