//! Two-panel state choropleth: mean age at death vs mean infrastructure index.

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::data::{Bounds, StateBoundaries};
use crate::error::AppError;
use crate::plot::{Colormap, DrawResult, MISSING_COLOR, font_scale, render_error};

pub const MAP_TITLE: &str = "Análise Comparativa Geográfica: Mortalidade e Infraestrutura";

pub const AGE_PANEL_TITLE: &str = "Idade Média de Óbito por Estado";
pub const AGE_LEGEND: &str = "Idade Média de Óbito";
pub const INDEX_PANEL_TITLE: &str = "Índice Médio de Infraestrutura Urbana por Estado";
pub const INDEX_LEGEND: &str = "Índice de Infraestrutura (0 a 1)";

/// Share of each panel's height used by the map (the rest holds the colour bar).
const MAP_SHARE: f64 = 0.84;
/// Number of swatches in the colour bar.
const LEGEND_STEPS: usize = 120;

/// One side of the figure: per-UF values and how to colour them.
#[derive(Debug, Clone, Copy)]
pub struct MapPanel<'a> {
    pub title: &'a str,
    pub legend_label: &'a str,
    pub values: &'a BTreeMap<String, f64>,
    pub colormap: Colormap,
}

/// Render the comparison figure PNG.
pub fn render_comparison_map(
    path: &Path,
    boundaries: &StateBoundaries,
    left: &MapPanel<'_>,
    right: &MapPanel<'_>,
    size: (u32, u32),
) -> Result<(), AppError> {
    draw_map(path, boundaries, left, right, size).map_err(|e| render_error("state map", e))
}

fn draw_map(
    path: &Path,
    boundaries: &StateBoundaries,
    left: &MapPanel<'_>,
    right: &MapPanel<'_>,
    size: (u32, u32),
) -> DrawResult {
    let bounds = boundaries
        .bounds()
        .ok_or("state boundaries have an empty extent")?;

    let s = font_scale(size.1);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(MAP_TITLE, ("sans-serif", 64.0 * s))?;

    let panels = root.split_evenly((1, 2));
    draw_panel(&panels[0], boundaries, bounds, left, s)?;
    draw_panel(&panels[1], boundaries, bounds, right, s)?;

    root.present()?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    boundaries: &StateBoundaries,
    bounds: Bounds,
    panel: &MapPanel<'_>,
    s: f64,
) -> DrawResult {
    let area = area.titled(panel.title, ("sans-serif", 44.0 * s))?;
    let (_, height) = area.dim_in_pixel();
    let (map_area, legend_area) = area.split_vertically((height as f64 * MAP_SHARE) as i32);

    let ufs: Vec<&str> = boundaries.states.iter().map(|st| st.uf.as_str()).collect();
    let range = legend_range(panel.values, &ufs);

    let margin = (40.0 * s) as i32;
    let (width, map_height) = map_area.dim_in_pixel();
    let inner = (
        width.saturating_sub(2 * margin as u32),
        map_height.saturating_sub(2 * margin as u32),
    );
    let (lon, lat) = fit_to_aspect(bounds, inner.0, inner.1);

    let mut chart = ChartBuilder::on(&map_area)
        .margin(margin)
        .build_cartesian_2d(lon, lat)?;

    let fill_for = |uf: &str| match (panel.values.get(uf), range) {
        (Some(&v), Some((lo, hi))) => panel.colormap.scaled(v, lo, hi),
        _ => MISSING_COLOR,
    };

    chart.draw_series(boundaries.states.iter().flat_map(|state| {
        let color = fill_for(&state.uf);
        state
            .rings
            .iter()
            .map(move |ring| Polygon::new(ring.clone(), color.filled()))
    }))?;
    chart.draw_series(
        boundaries
            .states
            .iter()
            .flat_map(|state| state.rings.iter())
            .map(|ring| PathElement::new(ring.clone(), BLACK.stroke_width(1))),
    )?;

    match range {
        Some((lo, hi)) => draw_colorbar(&legend_area, panel, lo, hi, s)?,
        None => {
            legend_area.draw(&Text::new(
                "sem dados",
                (margin, 0),
                ("sans-serif", 28.0 * s).into_font(),
            ))?;
        }
    }
    Ok(())
}

fn draw_colorbar(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    panel: &MapPanel<'_>,
    lo: f64,
    hi: f64,
    s: f64,
) -> DrawResult {
    let (width, _) = area.dim_in_pixel();
    let side = (width as f64 * 0.15) as i32;
    let precision = tick_precision(lo, hi);

    let mut chart = ChartBuilder::on(area)
        .margin_left(side)
        .margin_right(side)
        .margin_top((10.0 * s) as i32)
        .x_label_area_size((110.0 * s) as i32)
        .build_cartesian_2d(lo..hi, 0.0..1.0)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_y_axis()
        .x_labels(6)
        .x_label_formatter(&|v| format!("{v:.precision$}"))
        .x_desc(panel.legend_label)
        .label_style(("sans-serif", 24.0 * s))
        .axis_desc_style(("sans-serif", 28.0 * s))
        .draw()?;

    let step = (hi - lo) / LEGEND_STEPS as f64;
    chart.draw_series((0..LEGEND_STEPS).map(|i| {
        let x0 = lo + step * i as f64;
        let color = panel.colormap.scaled(x0 + step / 2.0, lo, hi);
        Rectangle::new([(x0, 0.0), (x0 + step, 1.0)], color.filled())
    }))?;
    Ok(())
}

/// Colour scale bounds over the values of states that are on the map.
///
/// A single distinct value is widened to `±0.5` so the bar still has a span.
pub fn legend_range(values: &BTreeMap<String, f64>, ufs: &[&str]) -> Option<(f64, f64)> {
    let (lo, hi) = ufs
        .iter()
        .filter_map(|uf| values.get(*uf))
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    if hi > lo { Some((lo, hi)) } else { Some((lo - 0.5, hi + 0.5)) }
}

/// Pad the lon/lat extent and widen one axis so the map keeps its shape in a
/// `width x height` pixel box (equirectangular, scaled by the mid-latitude).
pub fn fit_to_aspect(b: Bounds, width: u32, height: u32) -> (Range<f64>, Range<f64>) {
    let pad_lon = (b.lon_max - b.lon_min) * 0.02;
    let pad_lat = (b.lat_max - b.lat_min) * 0.02;
    let (mut lon_lo, mut lon_hi) = (b.lon_min - pad_lon, b.lon_max + pad_lon);
    let (mut lat_lo, mut lat_hi) = (b.lat_min - pad_lat, b.lat_max + pad_lat);

    let k = ((lat_lo + lat_hi) / 2.0).to_radians().cos().max(0.1);
    let map_w = (lon_hi - lon_lo) * k;
    let map_h = lat_hi - lat_lo;
    let target = width.max(1) as f64 / height.max(1) as f64;

    if map_w / map_h > target {
        let grow = (map_w / target - map_h) / 2.0;
        lat_lo -= grow;
        lat_hi += grow;
    } else {
        let grow = (map_h * target / k - (lon_hi - lon_lo)) / 2.0;
        lon_lo -= grow;
        lon_hi += grow;
    }
    (lon_lo..lon_hi, lat_lo..lat_hi)
}

fn tick_precision(lo: f64, hi: f64) -> usize {
    if hi - lo < 5.0 { 2 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn legend_range_only_counts_mapped_states() {
        let v = values(&[("SP", 75.0), ("AP", 60.0), ("PE - Juazeiro/BA", 10.0)]);
        assert_eq!(legend_range(&v, &["SP", "AP", "RJ"]), Some((60.0, 75.0)));
        assert_eq!(legend_range(&v, &["RJ"]), None);
        assert_eq!(legend_range(&v, &["SP"]), Some((74.5, 75.5)));
    }

    #[test]
    fn aspect_fit_matches_pixel_box() {
        let b = Bounds {
            lon_min: -74.0,
            lon_max: -34.8,
            lat_min: -33.8,
            lat_max: 5.3,
        };
        for (w, h) in [(3000u32, 2500u32), (1000, 3000), (800, 800)] {
            let (lon, lat) = fit_to_aspect(b, w, h);
            assert!(lon.start <= b.lon_min && lon.end >= b.lon_max);
            assert!(lat.start <= b.lat_min && lat.end >= b.lat_max);

            let k = ((lat.start + lat.end) / 2.0).to_radians().cos();
            let aspect = (lon.end - lon.start) * k / (lat.end - lat.start);
            assert!((aspect - w as f64 / h as f64).abs() < 1e-9, "{w}x{h}: {aspect}");
        }
    }

    #[test]
    fn tick_precision_by_span() {
        assert_eq!(tick_precision(0.2, 0.9), 2);
        assert_eq!(tick_precision(55.0, 78.0), 1);
    }
}
