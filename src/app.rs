//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments
//! - runs the analysis pipeline
//! - prints the report tables
//! - renders the charts and writes the optional export

use clap::Parser;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::data::{StateBoundaries, http_client};
use crate::domain::AnalysisConfig;
use crate::error::AppError;
use crate::plot::{
    AGE_LEGEND, AGE_PANEL_TITLE, AgeHistogram, Colormap, INDEX_LEGEND, INDEX_PANEL_TITLE, MapPanel,
};
use crate::report::{mean_age_by_uf, mean_index_by_uf};

pub mod pipeline;

/// 12 x 6 in at 300 dpi.
const HISTOGRAM_SIZE: (u32, u32) = (3600, 1800);
/// 22 x 10 in at 300 dpi.
const MAP_SIZE: (u32, u32) = (6600, 3000);

/// Entry point for the `mortinfra` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();
    crate::logging::init();

    let cli = Cli::parse();
    let config = config_from_args(&cli);

    let run = pipeline::run_analysis(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.mortality, &run.census, &run.tiers, &run.table)
    );
    println!("Gerado em {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("{}", crate::report::format_age_table(run.age_summary.as_ref()));
    println!("{}", crate::report::format_chapter_tables(&run.chapters));
    println!("{}", crate::report::format_ttest_table(&run.comparison));

    if config.plots {
        render_histogram(&config, &run.table.ages(None))?;
        render_map(&config, &run);
    }

    if let Some(path) = &config.export_path {
        crate::io::write_records_csv(path, &run.table.records)?;
        info!(path = %path.display(), rows = run.table.records.len(), "Working table exported");
    }

    info!("Analysis complete");
    Ok(())
}

pub fn config_from_args(cli: &Cli) -> AnalysisConfig {
    AnalysisConfig {
        mortality_path: cli.mortality_file.clone(),
        census_path: cli.census_file.clone(),
        data_dir: cli.data_dir.clone(),
        municipios_url: cli.municipios_url.clone(),
        municipios_file: cli.municipios_file.clone(),
        states_url: cli.states_url.clone(),
        offline: cli.offline,
        bins: cli.bins as usize,
        top_chapters: cli.top_chapters,
        plots: !cli.no_plots,
        histogram_path: cli.histogram_out.clone(),
        histogram_size: HISTOGRAM_SIZE,
        map_path: cli.map_out.clone(),
        map_size: MAP_SIZE,
        export_path: cli.export.clone(),
    }
}

fn render_histogram(config: &AnalysisConfig, ages: &[f64]) -> Result<(), AppError> {
    let Some(hist) = AgeHistogram::build(ages, config.bins) else {
        warn!("No ages to plot; histogram skipped");
        return Ok(());
    };
    crate::plot::render_age_histogram(&config.histogram_path, &hist, config.histogram_size)?;
    info!(path = %config.histogram_path.display(), "Histogram saved");
    Ok(())
}

/// The map is an optional extra: every failure is logged and the run goes on.
fn render_map(config: &AnalysisConfig, run: &pipeline::RunOutput) {
    if config.offline {
        info!("Offline mode: state map skipped");
        return;
    }

    info!("Generating comparative state map...");
    let boundaries = match http_client().and_then(|c| StateBoundaries::fetch(&c, &config.states_url)) {
        Ok(b) => b,
        Err(e) => {
            warn!("Could not load state boundaries ({e}); map skipped");
            return;
        }
    };

    let ages = mean_age_by_uf(&run.table);
    let index = mean_index_by_uf(&run.census.areas);
    let left = MapPanel {
        title: AGE_PANEL_TITLE,
        legend_label: AGE_LEGEND,
        values: &ages,
        colormap: Colormap::Viridis,
    };
    let right = MapPanel {
        title: INDEX_PANEL_TITLE,
        legend_label: INDEX_LEGEND,
        values: &index,
        colormap: Colormap::Plasma,
    };

    match crate::plot::render_comparison_map(&config.map_path, &boundaries, &left, &right, config.map_size) {
        Ok(()) => info!(path = %config.map_path.display(), "State map saved"),
        Err(e) => warn!("{e}; map skipped"),
    }
}
