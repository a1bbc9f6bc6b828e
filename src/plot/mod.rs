//! PNG chart rendering (Plotters bitmap backend).
//!
//! - age-at-death histogram with a KDE overlay (`histogram`)
//! - two-panel state choropleth (`choropleth`)
//! - the sequential colour maps they share (`colormap`)

pub mod choropleth;
pub mod colormap;
pub mod histogram;

pub use choropleth::*;
pub use colormap::*;
pub use histogram::*;

use crate::error::AppError;

type DrawResult = Result<(), Box<dyn std::error::Error>>;

/// Font sizes are tuned for a 1000px-tall image and scaled from there.
fn font_scale(height: u32) -> f64 {
    (height as f64 / 1000.0).max(0.4)
}

fn render_error(what: &str, err: Box<dyn std::error::Error>) -> AppError {
    AppError::runtime(format!("Failed to render {what}: {err}"))
}
