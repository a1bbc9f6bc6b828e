//! Shared analysis pipeline.
//!
//! load -> clean -> census tiers -> name lookup -> join/groups -> statistics
//!
//! Presentation (tables, charts, export) stays in `app`, so the whole
//! computation can be driven from tests with local files and no network.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::classify::{InfraTiers, WorkingTable, build_working_table};
use crate::data::{MunicipalityLookup, http_client};
use crate::domain::{AnalysisConfig, InfraGroup};
use crate::error::AppError;
use crate::io::{CensusIngest, MortalityIngest, load_census, load_mortality};
use crate::math::{Describe, describe};
use crate::report::{ChapterBreakdown, GroupComparison, chapter_breakdown, compare_groups};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub mortality: MortalityIngest,
    pub census: CensusIngest,
    pub tiers: InfraTiers,
    pub table: WorkingTable,
    /// Age describe over the whole working table; `None` when it is empty.
    pub age_summary: Option<Describe>,
    pub chapters: Vec<ChapterBreakdown>,
    pub comparison: GroupComparison,
}

/// Execute the full analysis and return the computed outputs.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    info!("Loading data...");
    let mortality_path = require_file(&config.data_dir, &config.mortality_path)?;
    let census_path = require_file(&config.data_dir, &config.census_path)?;

    info!(path = %mortality_path.display(), "Cleaning mortality records...");
    let mut mortality = load_mortality(&mortality_path)?;
    for e in &mortality.row_errors {
        warn!(line = e.line, "{}", e.message);
    }
    if mortality.records.is_empty() {
        return Err(AppError::no_data(format!(
            "No usable death records in '{}' ({} rows read).",
            mortality_path.display(),
            mortality.rows_read
        )));
    }
    info!(
        kept = mortality.records.len(),
        dropped = mortality.dropped.total(),
        no_age = mortality.dropped.no_age,
        no_cause = mortality.dropped.no_cause,
        no_sex = mortality.dropped.no_sex,
        no_municipality = mortality.dropped.no_municipality,
        malformed = mortality.dropped.malformed,
        "Mortality records cleaned"
    );

    info!(path = %census_path.display(), "Processing census infrastructure data...");
    let census = load_census(&census_path)?;
    let tiers = InfraTiers::from_areas(&census.areas)
        .ok_or_else(|| AppError::no_data("Census table produced no infrastructure index."))?;
    info!(
        areas = census.areas.len(),
        median = tiers.median,
        "Infrastructure tiers built"
    );

    info!("Joining records to municipalities...");
    let lookup = load_lookup(config);
    let records = std::mem::take(&mut mortality.records);
    let table = build_working_table(records, lookup.as_ref(), &tiers);
    if table.records.is_empty() {
        return Err(AppError::no_data(
            "No death records left after the municipality join.",
        ));
    }
    info!(
        records = table.records.len(),
        unmatched = table.unmatched,
        "Working table ready"
    );

    let age_summary = describe(&table.ages(None));
    let chapters = InfraGroup::CLASSIFIED
        .iter()
        .map(|&g| chapter_breakdown(&table, g, config.top_chapters))
        .collect();
    let comparison = compare_groups(&table);

    Ok(RunOutput {
        mortality,
        census,
        tiers,
        table,
        age_summary,
        chapters,
        comparison,
    })
}

/// Resolve `file` under `data_dir` and fail with a hint when it is missing.
fn require_file(data_dir: &Path, file: &Path) -> Result<PathBuf, AppError> {
    let path = data_dir.join(file);
    if path.is_file() {
        return Ok(path);
    }
    Err(AppError::input(format!(
        "Input file '{}' not found. Make sure the data files are in '{}' (see --data-dir).",
        path.display(),
        data_dir.display()
    )))
}

/// Municipality names from a local file or the remote CSV.
///
/// Any failure degrades to `None` (every record keeps the `N/A` name).
fn load_lookup(config: &AnalysisConfig) -> Option<MunicipalityLookup> {
    let result = if let Some(path) = &config.municipios_file {
        MunicipalityLookup::from_path(path)
    } else if config.offline {
        info!("Offline mode: municipality names are not fetched");
        return None;
    } else {
        http_client().and_then(|client| MunicipalityLookup::fetch(&client, &config.municipios_url))
    };

    match result {
        Ok(lookup) if !lookup.is_empty() => {
            info!(municipalities = lookup.len(), "Municipality names loaded");
            Some(lookup)
        }
        Ok(_) => {
            warn!("Municipality list is empty; names fall back to N/A");
            None
        }
        Err(e) => {
            warn!("Could not load municipality names ({e}); names fall back to N/A");
            None
        }
    }
}
