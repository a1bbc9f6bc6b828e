//! Age-at-death histogram with a Gaussian KDE overlay.

use std::path::Path;

use plotters::prelude::*;

use crate::error::AppError;
use crate::math::{GaussianKde, Histogram, histogram};
use crate::plot::{DrawResult, font_scale, render_error};

const TITLE: &str = "Distribuição da Idade no Óbito";
const X_DESC: &str = "Idade (em anos)";
const Y_DESC: &str = "Número de Óbitos";

/// Number of points along the KDE curve.
const KDE_POINTS: usize = 400;

const BAR_FILL: RGBColor = RGBColor(76, 114, 176);
const KDE_LINE: RGBColor = RGBColor(49, 76, 122);
const GRID: RGBColor = RGBColor(230, 230, 230);

/// Histogram bars plus the KDE curve scaled to counts.
#[derive(Debug, Clone)]
pub struct AgeHistogram {
    pub bins: Histogram,
    pub kde: Vec<(f64, f64)>,
}

impl AgeHistogram {
    /// Returns `None` when there are no ages to plot.
    pub fn build(ages: &[f64], bins: usize) -> Option<Self> {
        let bins = histogram(ages, bins)?;
        let kde = GaussianKde::fit(ages)
            .map(|k| {
                let scale = k.sample_size() * bins.bin_width();
                k.curve(bins.lo, bins.hi, KDE_POINTS, scale)
            })
            .unwrap_or_default();
        Some(Self { bins, kde })
    }

    fn y_max(&self) -> f64 {
        let kde_max = self.kde.iter().map(|&(_, y)| y).fold(0.0, f64::max);
        (self.bins.max_count() as f64).max(kde_max).max(1.0) * 1.05
    }
}

/// Render the histogram PNG.
pub fn render_age_histogram(path: &Path, hist: &AgeHistogram, size: (u32, u32)) -> Result<(), AppError> {
    draw_histogram(path, hist, size).map_err(|e| render_error("age histogram", e))
}

fn draw_histogram(path: &Path, hist: &AgeHistogram, size: (u32, u32)) -> DrawResult {
    let s = font_scale(size.1);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = hist.bins.lo..hist.bins.hi;
    let y_range = 0.0..hist.y_max();

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", 44.0 * s))
        .margin((30.0 * s) as i32)
        .x_label_area_size((80.0 * s) as i32)
        .y_label_area_size((130.0 * s) as i32)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .light_line_style(&GRID)
        .bold_line_style(&GRID)
        .x_desc(X_DESC)
        .y_desc(Y_DESC)
        .x_labels(10)
        .y_labels(8)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .label_style(("sans-serif", 24.0 * s))
        .axis_desc_style(("sans-serif", 30.0 * s))
        .draw()?;

    chart.draw_series(
        hist.bins
            .bars()
            .map(|(left, right, count)| Rectangle::new([(left, 0.0), (right, count as f64)], BAR_FILL.mix(0.75).filled())),
    )?;
    chart.draw_series(
        hist.bins
            .bars()
            .map(|(left, right, count)| Rectangle::new([(left, 0.0), (right, count as f64)], WHITE.stroke_width(1))),
    )?;

    if !hist.kde.is_empty() {
        chart.draw_series(LineSeries::new(
            hist.kde.iter().copied(),
            KDE_LINE.stroke_width((3.0 * s).max(1.0) as u32),
        ))?;
    }

    root.present()?;
    Ok(())
}
