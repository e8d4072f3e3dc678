//! # Visualization
//!
//! $$
//! \rho \mapsto \text{heatmap artifact}
//! $$
//!
//! Correlation heatmaps rendered with plotly and written as self-contained
//! HTML artifacts, one per requested view.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use ndarray::Array2;
use plotly::HeatMap;
use plotly::Layout;
use plotly::Plot;
use plotly::common::ColorScale;
use plotly::common::ColorScalePalette;

/// Renders a labelled square matrix into a persistent artifact.
pub trait CorrelationRenderer {
  /// Render `matrix` with `labels` on both axes under the artifact `stem`,
  /// returning the written path.
  fn render(&self, matrix: &Array2<f64>, labels: &[String], stem: &str) -> Result<PathBuf>;
}

/// Plotly heatmap renderer writing HTML artifacts into one directory.
#[derive(Clone, Debug)]
pub struct HeatmapRenderer {
  out_dir: PathBuf,
  title: String,
  palette: ColorScalePalette,
}

impl HeatmapRenderer {
  /// Renderer writing artifacts under `out_dir`.
  pub fn new(out_dir: impl Into<PathBuf>) -> Self {
    Self {
      out_dir: out_dir.into(),
      title: String::new(),
      palette: ColorScalePalette::RdBu,
    }
  }

  pub fn title(mut self, title: &str) -> Self {
    self.title = title.to_string();
    self
  }

  pub fn palette(mut self, palette: ColorScalePalette) -> Self {
    self.palette = palette;
    self
  }

  /// Assemble the heatmap plot for a labelled matrix.
  pub fn heatmap(&self, matrix: &Array2<f64>, labels: &[String], stem: &str) -> Plot {
    let z: Vec<Vec<f64>> = matrix.outer_iter().map(|row| row.to_vec()).collect();
    let trace = HeatMap::new(labels.to_vec(), labels.to_vec(), z)
      .color_scale(ColorScale::Palette(self.palette.clone()));

    let title = if self.title.is_empty() {
      stem.to_string()
    } else {
      format!("{} | {stem}", self.title)
    };

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(Layout::new().title(title.as_str()).width(720).height(720));
    plot
  }
}

impl CorrelationRenderer for HeatmapRenderer {
  fn render(&self, matrix: &Array2<f64>, labels: &[String], stem: &str) -> Result<PathBuf> {
    fs::create_dir_all(&self.out_dir)
      .with_context(|| format!("failed creating artifact directory {:?}", self.out_dir))?;

    let path = self.out_dir.join(format!("{stem}.html"));
    let plot = self.heatmap(matrix, labels, stem);
    plot.write_html(&path);

    Ok(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use ndarray::array;
  use tempfile::tempdir;

  fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn render_writes_html_artifact() {
    let dir = tempdir().unwrap();
    let renderer = HeatmapRenderer::new(dir.path()).title("correlation");
    let corr = array![[1.0, 0.4], [0.4, 1.0]];

    let path = renderer
      .render(&corr, &labels(&["AAA", "BBB"]), "corr_original")
      .unwrap();

    assert!(path.ends_with("corr_original.html"));
    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains("AAA"));
    assert!(!html.is_empty());
  }

  #[test]
  fn nested_output_directory_is_created() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("artifacts").join("hrp");
    let renderer = HeatmapRenderer::new(&nested);
    let corr = array![[1.0, -0.2], [-0.2, 1.0]];

    let path = renderer
      .render(&corr, &labels(&["X", "Y"]), "corr_seriated")
      .unwrap();

    assert!(path.exists());
  }
}
