//! Shared domain types.
//!
//! Records are kept as plain owned structs: the whole working table lives in
//! memory for the length of a single run.

use std::path::PathBuf;

/// Label used for records whose municipality name could not be looked up.
pub const UNKNOWN_MUNICIPALITY: &str = "N/A";

/// IBGE two-digit state codes and their UF abbreviations.
pub const UF_CODES: [(u8, &str); 27] = [
    (11, "RO"),
    (12, "AC"),
    (13, "AM"),
    (14, "RR"),
    (15, "PA"),
    (16, "AP"),
    (17, "TO"),
    (21, "MA"),
    (22, "PI"),
    (23, "CE"),
    (24, "RN"),
    (25, "PB"),
    (26, "PE"),
    (27, "AL"),
    (28, "SE"),
    (29, "BA"),
    (31, "MG"),
    (32, "ES"),
    (33, "RJ"),
    (35, "SP"),
    (41, "PR"),
    (42, "SC"),
    (43, "RS"),
    (50, "MS"),
    (51, "MT"),
    (52, "GO"),
    (53, "DF"),
];

/// Map an IBGE state code (first two digits of a municipality code) to its UF.
pub fn uf_for_state_code(code: u8) -> Option<&'static str> {
    UF_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, uf)| *uf)
}

/// State code encoded in the first two digits of a municipality code.
pub fn state_code_of(municipality_code: &str) -> Option<u8> {
    municipality_code.get(..2)?.parse().ok()
}

/// Infrastructure tier a record falls into after the name join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InfraGroup {
    Better,
    Worse,
    Unclassified,
}

impl InfraGroup {
    pub const CLASSIFIED: [InfraGroup; 2] = [InfraGroup::Better, InfraGroup::Worse];

    /// Short label stored in the working table and exports.
    pub fn label(self) -> &'static str {
        match self {
            InfraGroup::Better => "Melhor Infra",
            InfraGroup::Worse => "Pior Infra",
            InfraGroup::Unclassified => "Não Classificado",
        }
    }

    /// Long label used in report rows.
    pub fn display_name(self) -> &'static str {
        match self {
            InfraGroup::Better => "Melhor Infraestrutura",
            InfraGroup::Worse => "Pior Infraestrutura",
            InfraGroup::Unclassified => "Não Classificado",
        }
    }
}

/// A cleaned death record.
#[derive(Debug, Clone, PartialEq)]
pub struct MortalityRecord {
    /// Underlying cause of death (`CAUSABAS`), e.g. `I219`.
    pub cause_code: String,
    /// First character of the cause code.
    pub cid_chapter: char,
    /// Age at death in whole years (only year-coded ages are kept).
    pub age_years: u32,
    pub sex: String,
    pub race: Option<String>,
    pub marital_status: Option<String>,
    pub schooling: Option<String>,
    /// Six-digit IBGE municipality of residence (`CODMUNRES`).
    pub municipality_code: String,
}

impl MortalityRecord {
    pub fn state_code(&self) -> Option<u8> {
        state_code_of(&self.municipality_code)
    }
}

/// A record after municipality enrichment and tier assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedRecord {
    pub record: MortalityRecord,
    pub municipality_name: String,
    pub municipality_name_norm: String,
    pub group: InfraGroup,
}

/// One urban concentration row from the census infrastructure table.
#[derive(Debug, Clone, PartialEq)]
pub struct CensusArea {
    /// Raw `Concentração Urbana` label, e.g. `São Paulo/SP`.
    pub label: String,
    pub city: String,
    pub uf: String,
    pub pct_paved: f64,
    pub pct_lighting: f64,
    pub pct_sidewalk: f64,
    /// Mean of the three coverage ratios, in `[0, 1]` for well-formed inputs.
    pub infra_index: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `.env`).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub mortality_path: PathBuf,
    pub census_path: PathBuf,
    pub data_dir: PathBuf,

    pub municipios_url: String,
    pub municipios_file: Option<PathBuf>,
    pub states_url: String,
    /// Skip every network-dependent step (names fall back, map is skipped).
    pub offline: bool,

    pub bins: usize,
    pub top_chapters: usize,
    pub plots: bool,
    pub histogram_path: PathBuf,
    pub histogram_size: (u32, u32),
    pub map_path: PathBuf,
    pub map_size: (u32, u32),

    pub export_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_code_maps_to_uf() {
        assert_eq!(state_code_of("355030"), Some(35));
        assert_eq!(uf_for_state_code(35), Some("SP"));
        assert_eq!(uf_for_state_code(53), Some("DF"));
        assert_eq!(uf_for_state_code(99), None);
        assert_eq!(state_code_of("3"), None);
        assert_eq!(state_code_of("XX1234"), None);
    }

    #[test]
    fn group_labels() {
        assert_eq!(InfraGroup::Better.label(), "Melhor Infra");
        assert_eq!(InfraGroup::Worse.label(), "Pior Infra");
        assert_eq!(InfraGroup::Unclassified.label(), "Não Classificado");
    }
}
