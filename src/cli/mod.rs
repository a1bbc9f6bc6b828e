//! Command-line parsing for the mortality x infrastructure report.
//!
//! Every flag defaults to the dataset layout the report was built around, so a
//! bare `mortinfra` run inside the project directory reproduces the full output.

use std::path::PathBuf;

use clap::Parser;

use crate::data::{DEFAULT_MUNICIPIOS_URL, DEFAULT_STATES_URL};

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "mortinfra",
    version,
    about = "Mortality (SIM/DATASUS) x urban infrastructure (IBGE census) analysis"
)]
pub struct Cli {
    /// Directory holding the input files.
    #[arg(long, env = "MORTINFRA_DATA_DIR", default_value = "dados/")]
    pub data_dir: PathBuf,

    /// Death-record CSV, relative to the data directory.
    #[arg(long, default_value = "DO22OPEN.csv")]
    pub mortality_file: PathBuf,

    /// Census infrastructure table (.xlsx/.xls/.ods or .csv), relative to the data directory.
    #[arg(long, default_value = "tabela6591_con_urb.xlsx")]
    pub census_file: PathBuf,

    /// Municipality names CSV (`codigo_ibge`, `nome`).
    #[arg(long, env = "MORTINFRA_MUNICIPIOS_URL", default_value = DEFAULT_MUNICIPIOS_URL)]
    pub municipios_url: String,

    /// Read municipality names from a local CSV instead of the URL.
    #[arg(long, value_name = "CSV")]
    pub municipios_file: Option<PathBuf>,

    /// Brazilian state boundaries GeoJSON.
    #[arg(long, env = "MORTINFRA_STATES_URL", default_value = DEFAULT_STATES_URL)]
    pub states_url: String,

    /// Skip every network fetch (names fall back to N/A, the map is skipped).
    #[arg(long)]
    pub offline: bool,

    /// Histogram bin count.
    #[arg(long, default_value_t = 40, value_parser = clap::value_parser!(u16).range(1..))]
    pub bins: u16,

    /// Age histogram output.
    #[arg(long, default_value = "grafico_01_idade_distribuicao.png")]
    pub histogram_out: PathBuf,

    /// Comparative state map output.
    #[arg(long, default_value = "mapa_02_comparativo.png")]
    pub map_out: PathBuf,

    /// Do not render the PNG charts.
    #[arg(long)]
    pub no_plots: bool,

    /// Export the joined working table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// CID chapters listed per group in Table 2.
    #[arg(long, default_value_t = 10)]
    pub top_chapters: usize,
}
